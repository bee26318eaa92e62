use url::Url;
use userhub_shared::{Result, invalid};

/// Placeholder avatar stored when a user has no profile image yet.
pub const DEFAULT_AVATAR: &str = "https://ui-avatars.com/api/?background=random";

/// Turns a stored profile-image reference into something a client can load.
pub trait PathResolver: Send + Sync {
    fn resolve(&self, stored: Option<&str>) -> Option<String>;
}

/// Serves relative references from a public base URL.
///
/// Without a base, relative references are handed back as stored.
#[derive(Clone, Debug, Default)]
pub struct PublicPathResolver {
    base: Option<Url>,
}

impl PublicPathResolver {
    pub fn new(base_url: &str) -> Result<Self> {
        let Ok(mut base) = Url::parse(base_url.trim()) else {
            invalid!("Invalid public base url: {base_url}");
        };

        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            invalid!("Public base url must be an http(s) url: {base_url}");
        }

        // joined paths land under the base path, not beside it
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self { base: Some(base) })
    }
}

impl PathResolver for PublicPathResolver {
    fn resolve(&self, stored: Option<&str>) -> Option<String> {
        let stored = stored.map(str::trim).filter(|s| !s.is_empty())?;

        let Some(base) = &self.base else {
            return Some(stored.to_owned());
        };

        if stored.starts_with("//") {
            return base.join(stored).ok().map(String::from);
        }

        if Url::parse(stored).is_ok() {
            return Some(stored.to_owned());
        }

        let relative = stored.strip_prefix('/').unwrap_or(stored);
        match base.join(relative) {
            Ok(url) => Some(url.into()),
            Err(err) => {
                tracing::warn!(reference = stored, error = %err, "unresolvable profile reference");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_profile_references() {
        let resolver = PublicPathResolver::new("http://localhost:3000/files/").unwrap();

        assert_eq!(resolver.resolve(None), None);
        assert_eq!(resolver.resolve(Some(" ")), None);
        assert_eq!(
            resolver.resolve(Some(DEFAULT_AVATAR)).as_deref(),
            Some(DEFAULT_AVATAR)
        );
        assert_eq!(
            resolver.resolve(Some("/avatars/1.png")).as_deref(),
            Some("http://localhost:3000/files/avatars/1.png")
        );
    }

    #[test]
    fn keep_absolute_and_scheme_relative_references() {
        let resolver = PublicPathResolver::new("http://localhost:3000/files").unwrap();

        assert_eq!(
            resolver.resolve(Some("//cdn.example.com/a.png")).as_deref(),
            Some("http://cdn.example.com/a.png")
        );
        assert_eq!(
            resolver.resolve(Some("HTTPS://cdn.example.com/a.png")).as_deref(),
            Some("HTTPS://cdn.example.com/a.png")
        );
        assert_eq!(
            resolver.resolve(Some("a.png")).as_deref(),
            Some("http://localhost:3000/files/a.png")
        );
    }

    #[test]
    fn reject_invalid_base_url() {
        assert!(PublicPathResolver::new("not a url").is_err());
        assert!(PublicPathResolver::new("mailto:admin@userhub.localhost").is_err());
        assert!(PublicPathResolver::new("ftp://files.userhub.localhost").is_err());
    }

    #[test]
    fn without_base_relative_references_stay_as_stored() {
        let resolver = PublicPathResolver::default();

        assert_eq!(
            resolver.resolve(Some("avatars/1.png")).as_deref(),
            Some("avatars/1.png")
        );
    }
}
