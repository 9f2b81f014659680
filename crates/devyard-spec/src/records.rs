//! Spec records as declared in the specs directory.
//!
//! Required fields are plain values and optional ones are `Option` or
//! default to empty, so an absent key is visible in the type rather than
//! discovered by a failed lookup.

use devyard_common::error::{DevyardError, ImageSourceConflict, Result};
use devyard_common::types::Repo;
use serde::{Deserialize, Deserializer, Serialize};

/// Hard dependencies of an app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Depends {
    /// Apps that must be running and linked.
    pub apps: Vec<String>,
    /// Libs mounted into the container.
    pub libs: Vec<String>,
    /// Services that must be running and linked.
    pub services: Vec<String>,
}

/// Hard dependencies of a lib. Libs only depend on other libs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibDepends {
    /// Libs this lib needs mounted next to it.
    pub libs: Vec<String>,
}

/// Startup instructions of an app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commands {
    /// Run on the first start of a container only.
    #[serde(default, deserialize_with = "string_or_list")]
    pub once: Vec<String>,
    /// Run on every container start.
    #[serde(default, deserialize_with = "string_or_list")]
    pub always: Vec<String>,
}

/// Optional links, added only when the target is active.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditionalLinks {
    /// Candidate app targets.
    pub apps: Vec<String>,
    /// Candidate service targets.
    pub services: Vec<String>,
}

impl ConditionalLinks {
    /// Returns true when no targets are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty() && self.services.is_empty()
    }
}

/// Where an app's container image comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    /// A pullable image reference.
    Image(String),
    /// A build context directory containing a Dockerfile.
    Build(String),
}

/// An application with its own container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    /// Source repository. Image-only apps have none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<Repo>,
    /// Mount point of the repo inside the container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mount: Option<String>,
    /// Hard dependencies.
    #[serde(default)]
    pub depends: Depends,
    /// Startup instructions; `None` when the key is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Commands>,
    /// Image reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Build context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    /// Optional links to peers that may or may not be active.
    #[serde(default, skip_serializing_if = "ConditionalLinks::is_empty")]
    pub conditional_links: ConditionalLinks,
    /// In-container ports the port allocator should publish.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<u16>,
}

impl App {
    /// Resolves the single image source of the app named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`DevyardError::ImageSource`] unless exactly one of `image`
    /// and `build` is declared.
    pub fn image_source(&self, name: &str) -> Result<ImageSource> {
        match (&self.image, &self.build) {
            (Some(image), None) => Ok(ImageSource::Image(image.clone())),
            (None, Some(build)) => Ok(ImageSource::Build(build.clone())),
            (Some(_), Some(_)) => Err(DevyardError::ImageSource {
                app: name.to_string(),
                conflict: ImageSourceConflict::Both,
            }),
            (None, None) => Err(DevyardError::ImageSource {
                app: name.to_string(),
                conflict: ImageSourceConflict::Neither,
            }),
        }
    }
}

/// A library mounted into the containers of the apps that use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lib {
    /// Source repository.
    pub repo: Repo,
    /// Mount point inside every container using the lib.
    pub mount: String,
    /// Hard lib dependencies.
    #[serde(default)]
    pub depends: LibDepends,
    /// Shell instruction run from the mount on container start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install: Option<String>,
}

/// A third-party service container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Image reference.
    pub image: String,
    /// Command override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Volume strings passed through unchanged.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<String>,
    /// In-container ports the port allocator should publish.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<u16>,
}

/// A named activation group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bundle {
    /// Human-readable summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Apps activated by the bundle.
    pub apps: Vec<String>,
    /// Libs activated by the bundle.
    pub libs: Vec<String>,
    /// Services activated by the bundle.
    pub services: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}
