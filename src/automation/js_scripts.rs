//! JavaScript evaluated in the page
//!
//! Each script resolves its target through `document.evaluate` and returns a
//! `{ found, value }` object, so a missing element is distinguishable from an
//! empty value without relying on how `undefined` crosses the protocol.

use super::locator::Locator;

fn node(locator: &Locator) -> String {
    let xpath = serde_json::Value::String(locator.as_xpath().to_string());
    format!(
        "document.evaluate({xpath}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue"
    )
}

fn probe(locator: &Locator, body: &str) -> String {
    format!(
        r#"
    (() => {{
        const n = {node};
        if (!n) return {{ found: false, value: null }};
        {body}
    }})()
"#,
        node = node(locator)
    )
}

pub fn exists(locator: &Locator) -> String {
    probe(locator, "return { found: true, value: true };")
}

pub fn is_displayed(locator: &Locator) -> String {
    probe(
        locator,
        r#"const style = window.getComputedStyle(n);
        const boxed = !!(n.offsetWidth || n.offsetHeight || n.getClientRects().length);
        return { found: true, value: boxed && style.visibility !== 'hidden' && style.display !== 'none' };"#,
    )
}

pub fn click(locator: &Locator) -> String {
    probe(
        locator,
        r#"if (n.scrollIntoView) n.scrollIntoView({ block: 'center' });
        n.click();
        return { found: true, value: true };"#,
    )
}

pub fn clear_value(locator: &Locator) -> String {
    probe(
        locator,
        r#"n.focus();
        if ('value' in n) {
            n.value = '';
            n.dispatchEvent(new Event('input', { bubbles: true }));
        }
        return { found: true, value: true };"#,
    )
}

pub fn select_option(locator: &Locator, option: &str) -> String {
    let option = serde_json::Value::String(option.to_string());
    probe(
        locator,
        &format!(
            r#"const wanted = {option};
        const match_ = Array.from(n.options || []).find(o => o.text.trim() === wanted);
        if (!match_) return {{ found: true, value: false }};
        n.value = match_.value;
        n.dispatchEvent(new Event('change', {{ bubbles: true }}));
        return {{ found: true, value: true }};"#
        ),
    )
}

pub fn inner_text(locator: &Locator) -> String {
    probe(
        locator,
        r#"const text = (n.innerText !== undefined ? n.innerText : n.textContent) || '';
        return { found: true, value: text };"#,
    )
}

pub fn attribute(locator: &Locator, name: &str) -> String {
    let name = serde_json::Value::String(name.to_string());
    probe(
        locator,
        &format!("return {{ found: true, value: n.getAttribute({name}) }};"),
    )
}

pub fn is_checked(locator: &Locator) -> String {
    probe(locator, "return { found: true, value: !!n.checked };")
}

pub fn count(locator: &Locator) -> String {
    let xpath = serde_json::Value::String(locator.as_xpath().to_string());
    format!(
        "document.evaluate({xpath}, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null).snapshotLength"
    )
}

pub const HISTORY_BACK: &str = "(() => { window.history.back(); return true; })()";
