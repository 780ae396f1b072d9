//! Breadcrumb trail construction
//!
//! Derives the ancestor folders of a selected file or folder and builds a
//! link for each one into the list's default view, filtered to that folder.

use thiserror::Error;

use crate::api::ListViewDetails;

/// Where a breadcrumb link should open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    NewTab,
    SameTab,
}

impl LinkTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkTarget::NewTab => "_blank",
            LinkTarget::SameTab => "_self",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbItem {
    pub label: String,
    pub url: String,
    pub target: LinkTarget,
}

/// What to do when the target path is not under the base path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BasePathPolicy {
    /// Treat the whole target path as relative to the base
    #[default]
    Lenient,
    /// Refuse to build a trail
    Strict,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BreadcrumbError {
    #[error("view descriptor has no id")]
    MissingViewId,
    #[error("view descriptor has no server-relative URL")]
    MissingViewUrl,
    #[error("'{target}' is not under base path '{base}'")]
    OutsideBase { target: String, base: String },
}

/// Strip `base` from `target` on a path-component boundary
fn strip_base<'a>(target: &'a str, base: &str) -> Option<&'a str> {
    let base = base.trim_end_matches('/');
    let rest = target.strip_prefix(base)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

/// Build the breadcrumb trail, reporting why it could not be built
///
/// The target's own name is never part of the trail; each remaining
/// component links to the view filtered on the path accumulated so far.
pub fn try_build_breadcrumbs(
    target: &str,
    base: &str,
    view: &ListViewDetails,
    policy: BasePathPolicy,
) -> Result<Vec<BreadcrumbItem>, BreadcrumbError> {
    if view.id.trim().is_empty() {
        return Err(BreadcrumbError::MissingViewId);
    }
    if view.server_relative_url.trim().is_empty() {
        return Err(BreadcrumbError::MissingViewUrl);
    }

    let relative = match (strip_base(target, base), policy) {
        (Some(rest), _) => rest,
        (None, BasePathPolicy::Lenient) => target,
        (None, BasePathPolicy::Strict) => {
            return Err(BreadcrumbError::OutsideBase {
                target: target.to_string(),
                base: base.to_string(),
            })
        }
    };

    let mut components: Vec<&str> = relative.split('/').filter(|c| !c.is_empty()).collect();
    components.pop();

    let encoded_view = urlencoding::encode(&format!("{{{}}}", view.id.to_uppercase())).into_owned();
    let mut accumulated = base.to_string();

    let items = components
        .into_iter()
        .map(|folder| {
            if !accumulated.ends_with('/') {
                accumulated.push('/');
            }
            accumulated.push_str(folder);

            BreadcrumbItem {
                label: folder.to_string(),
                url: format!(
                    "{}?RootFolder={}&View={}",
                    view.server_relative_url,
                    urlencoding::encode(&accumulated),
                    encoded_view
                ),
                target: LinkTarget::NewTab,
            }
        })
        .collect();

    Ok(items)
}

/// Build the breadcrumb trail, degrading to an empty trail on any error
pub fn build_breadcrumbs(
    target: &str,
    base: &str,
    view: &ListViewDetails,
    policy: BasePathPolicy,
) -> Vec<BreadcrumbItem> {
    match try_build_breadcrumbs(target, base, view, policy) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Error generating breadcrumb items for '{}': {}", target, e);
            Vec::new()
        }
    }
}

/// Decode the `RootFolder` query parameter of a breadcrumb URL
pub fn root_folder_from_url(url: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "RootFolder")
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
}
