//! npm package specifiers: `name[@version][/subpath]`.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn grammar() -> Option<&'static Regex> {
    static GRAMMAR: OnceLock<Option<Regex>> = OnceLock::new();
    GRAMMAR
        .get_or_init(|| {
            Regex::new(
                r"^(?P<name>(?:@[a-z0-9~][a-z0-9._~-]*/)?[a-z0-9~][a-z0-9._~-]*)(?:@(?P<version>[^/\s@]+))?(?P<subpath>/[^\s]*)?$",
            )
            .ok()
        })
        .as_ref()
}

/// A bare package specifier split into its parts.
///
/// # Examples
///
/// ```
/// use module_resolver::PackageSpecifier;
///
/// let spec = PackageSpecifier::parse("@scope/pkg@beta/sub/path").unwrap();
/// assert_eq!(spec.name, "@scope/pkg");
/// assert_eq!(spec.version.as_deref(), Some("beta"));
/// assert_eq!(spec.subpath.as_deref(), Some("/sub/path"));
/// assert_eq!(spec.bare(), "@scope/pkg/sub/path");
///
/// assert!(PackageSpecifier::parse("./local.js").is_none());
/// assert!(PackageSpecifier::parse("https://esm.sh/react").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpecifier {
    /// Package name, including the scope
    pub name: String,
    /// Version or dist-tag, without the `@`
    pub version: Option<String>,
    /// Path inside the package, starting with `/`
    pub subpath: Option<String>,
}

impl PackageSpecifier {
    /// Parses a bare specifier; returns `None` for relative, absolute or
    /// malformed specifiers.
    pub fn parse(specifier: &str) -> Option<Self> {
        let captures = grammar()?.captures(specifier)?;
        let name = captures.name("name")?.as_str();
        Some(Self {
            name: name.to_string(),
            version: captures.name("version").map(|m| m.as_str().to_string()),
            subpath: captures
                .name("subpath")
                .map(|m| m.as_str().to_string())
                .filter(|s| s != "/"),
        })
    }

    /// The specifier without its version.
    pub fn bare(&self) -> String {
        format!("{}{}", self.name, self.subpath.as_deref().unwrap_or(""))
    }

    /// The CDN URL serving this package as an ES module.
    ///
    /// # Examples
    ///
    /// ```
    /// use module_resolver::PackageSpecifier;
    ///
    /// let spec = PackageSpecifier::parse("lodash@4.17.21").unwrap();
    /// assert_eq!(
    ///     spec.cdn_url("cdn.jsdelivr.net"),
    ///     "https://cdn.jsdelivr.net/npm/lodash@4.17.21/+esm"
    /// );
    /// ```
    pub fn cdn_url(&self, host: &str) -> String {
        format!("https://{}/npm/{}/+esm", host, self)
    }
}

impl fmt::Display for PackageSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(version) = &self.version {
            write!(f, "@{}", version)?;
        }
        if let Some(subpath) = &self.subpath {
            write!(f, "{}", subpath)?;
        }
        Ok(())
    }
}

/// Returns true if the specifier names a package rather than a path or URL.
pub fn is_bare(specifier: &str) -> bool {
    PackageSpecifier::parse(specifier).is_some()
}
