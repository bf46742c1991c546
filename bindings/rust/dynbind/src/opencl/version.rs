//! Version parsing and capability tags
//!
//! OpenCL reports its version as text (`"OpenCL 1.2 AMD-APP (1800.11)"`) and
//! its extensions as a whitespace separated list. Both are folded into one
//! [`CapabilitySet`] so that feature checks become membership tests:
//! `caps.contains("OpenCL12")` instead of comparing version numbers.

use std::collections::hash_set;
use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// Minor versions per major version, starting at 1.x
const CL_VERSIONS: &[&[u32]] = &[
    &[0, 1, 2], // 10, 11, 12
    &[0],       // 20
];

/// GL interop tiers
const CL_GL_VERSIONS: &[&[u32]] = &[
    &[0, 2], // 10GL, 12GL
    &[],
];

/// Extensions that advertise OpenGL sharing
pub const GL_SHARING_EXTENSIONS: [&str; 2] = ["cl_khr_gl_sharing", "cl_APPLE_gl_sharing"];

/// A parsed API version: `<major>.<minor>[.<revision>] [implementation]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiVersion {
    pub major: u32,
    pub minor: u32,
    pub revision: Option<u32>,
    /// Vendor text following the numeric part, if any
    pub implementation: Option<String>,
}

impl ApiVersion {
    pub fn new(major: u32, minor: u32) -> Self {
        Self {
            major,
            minor,
            revision: None,
            implementation: None,
        }
    }

    /// True if this version is `major.minor` or later
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(revision) = self.revision {
            write!(f, ".{}", revision)?;
        }
        if let Some(implementation) = &self.implementation {
            write!(f, " {}", implementation)?;
        }
        Ok(())
    }
}

/// Parse `"<prefix>[whitespace]<major>.<minor>[.<revision>][suffix]"`.
///
/// Anything that does not match that shape is an [`Error::VersionParse`];
/// no version is ever assumed.
///
/// ```
/// let v = dynbind::opencl::parse_version("OpenCL 1.2 AMD-APP (1800.11)", "OpenCL").unwrap();
/// assert_eq!((v.major, v.minor), (1, 2));
/// ```
pub fn parse_version(text: &str, prefix: &str) -> Result<ApiVersion> {
    let rest = text
        .strip_prefix(prefix)
        .ok_or_else(|| Error::version_parse(text))?
        .trim_start();

    let (major, rest) = leading_number(rest).ok_or_else(|| Error::version_parse(text))?;
    let rest = rest.strip_prefix('.').ok_or_else(|| Error::version_parse(text))?;
    let (minor, rest) = leading_number(rest).ok_or_else(|| Error::version_parse(text))?;

    let (revision, rest) = match rest.strip_prefix('.').and_then(leading_number) {
        Some((revision, rest)) => (Some(revision), rest),
        None => (None, rest),
    };

    let implementation = rest.trim();
    Ok(ApiVersion {
        major,
        minor,
        revision,
        implementation: (!implementation.is_empty()).then(|| implementation.to_string()),
    })
}

/// Split a leading run of ASCII digits off `text`.
fn leading_number(text: &str) -> Option<(u32, &str)> {
    let end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    let value = text[..end].parse().ok()?;
    Some((value, &text[end..]))
}

/// Set of capability tags and extension names. Membership only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    tags: HashSet<String>,
}

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full set for a platform: its extensions plus version tags.
    pub fn build(version: &ApiVersion, extensions: &str) -> Self {
        let mut set = tokenize_extensions(extensions);
        add_cl_versions(version.major, version.minor, &mut set);
        set
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> hash_set::Iter<'_, String> {
        self.tags.iter()
    }

    /// Tags in lexical order, for display
    pub fn sorted(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    pub(crate) fn insert(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a String;
    type IntoIter = hash_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.tags.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tags: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// One tag per whitespace separated token; duplicates collapse.
pub fn tokenize_extensions(text: &str) -> CapabilitySet {
    text.split_whitespace().collect()
}

/// Add `OpenCL<major><minor>` tags for every version up to `major.minor`,
/// plus the `GL` variants when the set advertises GL sharing.
///
/// Must be called after the extensions have been added to `set`.
pub fn add_cl_versions(major: u32, minor: u32, set: &mut CapabilitySet) {
    add_versions(major, minor, set, "", CL_VERSIONS);

    if GL_SHARING_EXTENSIONS.iter().any(|ext| set.contains(ext)) {
        add_versions(major, minor, set, "GL", CL_GL_VERSIONS);
    }
}

fn add_versions(major: u32, minor: u32, set: &mut CapabilitySet, suffix: &str, tiers: &[&[u32]]) {
    for (index, minors) in tiers.iter().enumerate().take(major as usize) {
        let tier = index as u32 + 1;
        for &tier_minor in minors.iter() {
            if tier == major && minor < tier_minor {
                break;
            }
            set.insert(format!("OpenCL{}{}{}", tier, tier_minor, suffix));
        }
    }
}
