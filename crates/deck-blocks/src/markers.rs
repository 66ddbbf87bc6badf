//! Marker literals delimiting the managed section.
//!
//! Each file family gets its own namespace so that a shell section is never
//! mistaken for a hosts section and vice versa:
//!
//! ```text
//! # ========== EnvDeck Managed Variables ==========
//! # ========== End of EnvDeck Managed Variables ==========
//! # ========== EnvDeck Managed Hosts ==========
//! # ========== End of EnvDeck Managed Hosts ==========
//! ```

use std::fmt;

use uuid::Uuid;

/// Product name written into every marker.
pub const DEFAULT_PRODUCT: &str = "EnvDeck";

/// The kind of target file a section lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Shell startup scripts holding `export` lines.
    Variables,
    /// The hosts file holding `ip hostname` lines.
    Hosts,
}

impl Family {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Variables => "Variables",
            Self::Hosts => "Hosts",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The full set of marker strings for one product and family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    product: String,
    family: Family,
    section_start: String,
    section_end: String,
    warning: String,
}

impl Markers {
    pub fn new(product: impl Into<String>, family: Family) -> Self {
        let product = product.into();
        let label = family.label();
        Self {
            section_start: format!("# ========== {product} Managed {label} =========="),
            section_end: format!("# ========== End of {product} Managed {label} =========="),
            warning: format!(
                "# WARNING: This section is managed by {product}. Do not edit manually."
            ),
            product,
            family,
        }
    }

    /// Markers for shell startup scripts.
    pub fn variables() -> Self {
        Self::new(DEFAULT_PRODUCT, Family::Variables)
    }

    /// Markers for the hosts file.
    pub fn hosts() -> Self {
        Self::new(DEFAULT_PRODUCT, Family::Hosts)
    }

    pub fn family(&self) -> Family {
        self.family
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn section_start(&self) -> &str {
        &self.section_start
    }

    pub fn section_end(&self) -> &str {
        &self.section_end
    }

    pub fn warning(&self) -> &str {
        &self.warning
    }

    /// `# [EnvDeck:<ID>] START - <name>`, id in uppercase.
    pub fn group_start(&self, id: Uuid, name: &str) -> String {
        format!("# [{}:{}] START - {}", self.product, upper_id(id), name)
    }

    /// `# [EnvDeck:<ID>] END - <name>`, id in uppercase.
    pub fn group_end(&self, id: Uuid, name: &str) -> String {
        format!("# [{}:{}] END - {}", self.product, upper_id(id), name)
    }
}

fn upper_id(id: Uuid) -> String {
    id.hyphenated().to_string().to_uppercase()
}

/// True if `line` carries `marker` anywhere.
///
/// Containment rather than equality, so trailing whitespace or stray
/// characters on a marker line do not hide it.
pub fn is_marker_line(line: &str, marker: &str) -> bool {
    line.contains(marker)
}

/// Location of an existing managed section, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpan {
    pub start_line: usize,
    /// `None` when the start marker has no matching end marker.
    pub end_line: Option<usize>,
}

/// Find the first managed section in `content`.
pub fn locate(markers: &Markers, content: &str) -> Option<SectionSpan> {
    let mut lines = content.split('\n').enumerate();

    let start_line = lines
        .by_ref()
        .find(|(_, line)| is_marker_line(line, markers.section_start()))
        .map(|(idx, _)| idx + 1)?;

    let end_line = lines
        .find(|(_, line)| is_marker_line(line, markers.section_end()))
        .map(|(idx, _)| idx + 1);

    Some(SectionSpan {
        start_line,
        end_line,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_variables_markers() {
        let markers = Markers::variables();
        assert_eq!(
            markers.section_start(),
            "# ========== EnvDeck Managed Variables =========="
        );
        assert_eq!(
            markers.section_end(),
            "# ========== End of EnvDeck Managed Variables =========="
        );
        assert_eq!(
            markers.warning(),
            "# WARNING: This section is managed by EnvDeck. Do not edit manually."
        );
    }

    #[test]
    fn test_group_markers_use_uppercase_id() {
        let id = Uuid::parse_str("6f1c2a4e-8b3d-4c5e-9f60-1a2b3c4d5e6f").unwrap();
        let markers = Markers::hosts();
        assert_eq!(
            markers.group_start(id, "dev"),
            "# [EnvDeck:6F1C2A4E-8B3D-4C5E-9F60-1A2B3C4D5E6F] START - dev"
        );
        assert_eq!(
            markers.group_end(id, "dev"),
            "# [EnvDeck:6F1C2A4E-8B3D-4C5E-9F60-1A2B3C4D5E6F] END - dev"
        );
    }

    #[test]
    fn test_end_marker_does_not_contain_start_marker() {
        for markers in [Markers::variables(), Markers::hosts()] {
            assert!(!is_marker_line(markers.section_end(), markers.section_start()));
        }
    }

    #[test]
    fn test_families_do_not_recognise_each_other() {
        let vars = Markers::variables();
        let hosts = Markers::hosts();
        assert!(!is_marker_line(vars.section_start(), hosts.section_start()));
        assert!(!is_marker_line(hosts.section_end(), vars.section_end()));
    }

    #[rstest]
    #[case("# ========== EnvDeck Managed Variables ==========", true)]
    #[case("# ========== EnvDeck Managed Variables ==========   ", true)]
    #[case("  # ========== EnvDeck Managed Variables ========== extra", true)]
    #[case("# ========== EnvDeck Managed Variables =========", false)]
    #[case("# EnvDeck Managed Variables", false)]
    fn test_is_marker_line(#[case] line: &str, #[case] expected: bool) {
        let markers = Markers::variables();
        assert_eq!(is_marker_line(line, markers.section_start()), expected);
    }

    #[test]
    fn test_locate() {
        let markers = Markers::variables();
        let content = format!(
            "a\n{}\nexport X=\"1\"\n{}\nb",
            markers.section_start(),
            markers.section_end()
        );
        assert_eq!(
            locate(&markers, &content),
            Some(SectionSpan {
                start_line: 2,
                end_line: Some(4)
            })
        );
        assert_eq!(locate(&markers, "a\nb"), None);
    }

    #[test]
    fn test_locate_unterminated() {
        let markers = Markers::hosts();
        let content = format!("{}\n1.1.1.1 x", markers.section_start());
        assert_eq!(
            locate(&markers, &content),
            Some(SectionSpan {
                start_line: 1,
                end_line: None
            })
        );
    }
}
