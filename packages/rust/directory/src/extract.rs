//! Office code extraction from directory profile pages.
//!
//! Pages are not parsed as a DOM: the code sits in a table cell whose markup
//! varies, so matching is done on the raw HTML with a three-step fallback.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use despachos_shared::PLACEHOLDER_OFFICE;

/// A labeled office row: `Despacho:` (or `Office:`) followed, possibly on a
/// later line, by a `>CODE<` element body.
static LABELED_OFFICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:Despacho|Office):.*?>(B1\.3\.\d+)<").expect("valid regex")
});

/// Any office code, anywhere.
static OFFICE_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"B1\.3\.\d+").expect("valid regex"));

/// Extract the office code from a profile page.
///
/// Returns the labeled code if present, else the first bare code in the
/// document, else [`PLACEHOLDER_OFFICE`].
pub fn extract_office(html: &str) -> &str {
    if let Some(code) = LABELED_OFFICE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
    {
        trace!(code = code.as_str(), "labeled office code");
        return code.as_str();
    }

    if let Some(code) = OFFICE_CODE_RE.find(html) {
        trace!(code = code.as_str(), "bare office code");
        return code.as_str();
    }

    trace!("no office code found");
    PLACEHOLDER_OFFICE
}

/// Whether `code` has the shape of a real office code (not the placeholder).
pub fn is_office_code(code: &str) -> bool {
    OFFICE_CODE_RE
        .find(code)
        .is_some_and(|m| m.start() == 0 && m.end() == code.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROFILE_PAGE: &str = r#"
<html><body>
  <div class="cabecera">Edificio B1.3.999 (conserjería)</div>
  <table class="ficha">
    <tr><td>Teléfono:</td><td>868 88 0000</td></tr>
    <tr>
      <td class="etiqueta">Despacho:</td>
      <td>
        <a href="/atica/directorio/?espacio=B1.3.042">B1.3.042</a>
      </td>
    </tr>
  </table>
</body></html>
"#;

    #[test]
    fn labeled_code_wins_over_earlier_codes() {
        assert_eq!(extract_office(PROFILE_PAGE), "B1.3.042");
    }

    #[test]
    fn english_label_is_recognized() {
        let html = "<p>See B1.3.001</p><dl><dt>Office:</dt>\n<dd><span>B1.3.17</span></dd></dl>";
        assert_eq!(extract_office(html), "B1.3.17");
    }

    #[test]
    fn falls_back_to_first_bare_code() {
        let html = "<ul><li>Sala B1.3.007</li><li>Lab B1.3.120</li></ul>";
        assert_eq!(extract_office(html), "B1.3.007");
    }

    #[test]
    fn label_without_element_value_uses_bare_code() {
        let html = "<td>Despacho: B1.3.055 (planta 3)</td>";
        assert_eq!(extract_office(html), "B1.3.055");
    }

    #[test]
    fn no_code_yields_placeholder() {
        assert_eq!(extract_office("<html><body>Sin datos</body></html>"), PLACEHOLDER_OFFICE);
        assert_eq!(extract_office(""), PLACEHOLDER_OFFICE);
        // Other buildings and a code without digits do not match.
        assert_eq!(extract_office("<td>Despacho:</td><td>B2.1.004</td> B1.3.x"), PLACEHOLDER_OFFICE);
    }

    #[test]
    fn office_code_shape() {
        assert!(is_office_code("B1.3.042"));
        assert!(is_office_code("B1.3.1"));
        assert!(!is_office_code(PLACEHOLDER_OFFICE));
        assert!(!is_office_code("B1.3."));
        assert!(!is_office_code("xB1.3.042"));
    }
}
