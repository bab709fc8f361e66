use std::fmt;

/// Prefix every fleet repository name carries; the image name is the rest.
pub const REPOSITORY_PREFIX: &str = "docker-";

/// Tag of the floating alias pushed next to every published image.
pub const LATEST_TAG: &str = "latest";

/// A container image reference, rendered as `account/image:tag`.
///
/// # Examples
///
/// ```
/// use relsync_core::ImageReference;
///
/// let image = ImageReference::for_repository("docker-cpp-gcc", "acct", "v3").unwrap();
/// assert_eq!(image.to_string(), "acct/cpp-gcc:v3");
/// assert_eq!(image.latest().to_string(), "acct/cpp-gcc:latest");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageReference {
    pub account: String,
    pub image: String,
    pub tag: String,
}

impl ImageReference {
    /// Derive the reference for a fleet repository built at `marker`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingImagePrefix`](crate::Error::MissingImagePrefix) if the
    /// repository name does not start with [`REPOSITORY_PREFIX`].
    pub fn for_repository(repository: &str, account: &str, marker: &str) -> crate::Result<Self> {
        Ok(Self {
            account: account.to_owned(),
            image: image_name(repository)?.to_owned(),
            tag: marker.to_owned(),
        })
    }

    /// Same account and image, tagged [`LATEST_TAG`].
    pub fn latest(&self) -> Self {
        Self {
            tag: LATEST_TAG.to_owned(),
            ..self.clone()
        }
    }

    /// Account to authenticate as: everything before the first `/`.
    pub fn account(&self) -> &str {
        self.account
            .split_once('/')
            .map_or(self.account.as_str(), |(head, _)| head)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.account, self.image, self.tag)
    }
}

/// Image name published for a fleet repository (the name minus its prefix).
pub fn image_name(repository: &str) -> crate::Result<&str> {
    repository
        .strip_prefix(REPOSITORY_PREFIX)
        .filter(|rest| !rest.is_empty())
        .ok_or_else(|| crate::Error::MissingImagePrefix {
            name: repository.to_owned(),
        })
}
