//! Package entry resolution for virtual module paths.
//!
//! `/@modules/vue` names a package, not a file. The resolver reads the
//! package's `package.json` from the dependency directory and points the
//! request at its ES module entry before the static file stage runs:
//!
//! ```text
//! /@modules/vue            -> /node_modules/vue/dist/vue.esm-browser.js
//! /@modules/@vue/shared    -> /node_modules/@vue/shared/<module>
//! /@modules/lodash-es/x.js -> /node_modules/lodash-es/x.js   (no manifest read)
//! ```
//!
//! Manifests are re-read on every request so edits under the dependency
//! directory are picked up without a restart.

use crate::config::DevConfig;
use crate::dev::context::RequestContext;
use crate::dev::error::{PipelineError, ResolveError};
use crate::dev::pipeline::Stage;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

/// Manifests larger than this are rejected before parsing.
const MAX_MANIFEST_SIZE: u64 = 10 * 1024 * 1024;

/// Percent-encodes each segment of a manifest entry so the resolved path is
/// a valid URI path. Subpaths come from the request URI and are already
/// encoded.
fn encode_entry(entry: &str) -> String {
    entry
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// The fields of `package.json` the resolver reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// Package name
    pub name: Option<String>,
    /// Package version
    pub version: Option<String>,
    /// ES module entry, relative to the package directory
    pub module: Option<String>,
    /// CommonJS entry; only reported, never served
    pub main: Option<String>,
}

/// A bare specifier split into package name and optional file subpath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier<'a> {
    /// `vue`, `@vue/shared`
    pub package: &'a str,
    /// `dist/x.js` in `lodash-es/dist/x.js`
    pub subpath: Option<&'a str>,
}

/// Splits `specifier` into package and subpath, rejecting names that would
/// escape the dependency directory.
pub fn parse_specifier(specifier: &str) -> Result<Specifier<'_>, ResolveError> {
    let invalid = || ResolveError::InvalidName(specifier.to_string());

    if specifier.contains('\\') {
        return Err(invalid());
    }
    if specifier
        .split('/')
        .any(|segment| segment.is_empty() || segment == "." || segment == "..")
    {
        return Err(invalid());
    }

    let name_segments = if specifier.starts_with('@') { 2 } else { 1 };
    let mut split_at = None;
    for (count, (index, _)) in specifier.match_indices('/').enumerate() {
        if count + 1 == name_segments {
            split_at = Some(index);
            break;
        }
    }

    match split_at {
        Some(index) => Ok(Specifier {
            package: &specifier[..index],
            subpath: Some(&specifier[index + 1..]),
        }),
        None if name_segments == 2 && !specifier.contains('/') => Err(invalid()),
        None => Ok(Specifier {
            package: specifier,
            subpath: None,
        }),
    }
}

/// Maps virtual module paths to files in the dependency directory.
#[derive(Debug, Clone)]
pub struct PackageResolver {
    root: PathBuf,
    deps_dir: String,
    prefix: String,
}

impl PackageResolver {
    /// Creates a resolver for the given configuration.
    pub fn new(config: &DevConfig) -> Self {
        Self {
            root: config.root.clone(),
            deps_dir: config.deps_dir.clone(),
            prefix: config.module_path_prefix(),
        }
    }

    /// The bare specifier of a virtual module path, if `path` is one.
    pub fn specifier<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.prefix.as_str())
    }

    /// Resolves a bare specifier to the request path of the file to serve.
    pub async fn resolve(&self, specifier: &str) -> Result<String, ResolveError> {
        let Specifier { package, subpath } = parse_specifier(specifier)?;

        let file = match subpath {
            Some(subpath) => subpath.to_string(),
            None => {
                let manifest = self.read_manifest(package).await?;
                match manifest.module {
                    Some(entry) => encode_entry(entry.trim_start_matches("./")),
                    None => {
                        return Err(ResolveError::NoModuleEntry {
                            package: package.to_string(),
                            main: manifest.main,
                        });
                    }
                }
            }
        };

        Ok(format!("/{}/{}/{}", self.deps_dir, package, file))
    }

    /// Reads and parses `<root>/<deps_dir>/<package>/package.json`.
    pub async fn read_manifest(&self, package: &str) -> Result<PackageManifest, ResolveError> {
        let path = self
            .root
            .join(&self.deps_dir)
            .join(package)
            .join("package.json");

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ResolveError::NotInstalled {
                    package: package.to_string(),
                    path,
                });
            }
            Err(source) => return Err(ResolveError::Io { path, source }),
        };

        if metadata.len() > MAX_MANIFEST_SIZE {
            return Err(ResolveError::ManifestTooLarge {
                package: package.to_string(),
                size: metadata.len(),
                max: MAX_MANIFEST_SIZE,
            });
        }

        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(source) => return Err(ResolveError::Io { path, source }),
        };

        serde_json::from_slice(&content).map_err(|source| ResolveError::InvalidManifest {
            package: package.to_string(),
            source,
        })
    }
}

/// Stage (a): rewrites virtual module paths to package entry files.
#[derive(Debug)]
pub struct PackageEntryStage {
    resolver: PackageResolver,
}

impl PackageEntryStage {
    pub fn new(resolver: PackageResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Stage for PackageEntryStage {
    fn name(&self) -> &'static str {
        "package-entry"
    }

    fn applies(&self, ctx: &RequestContext) -> bool {
        self.resolver.specifier(&ctx.path).is_some()
    }

    async fn run(&self, ctx: &mut RequestContext) -> Result<(), PipelineError> {
        let Some(specifier) = self.resolver.specifier(&ctx.path) else {
            return Ok(());
        };

        let resolved = self.resolver.resolve(specifier).await?;
        tracing::debug!(from = %ctx.path, to = %resolved, "resolved package entry");
        ctx.path = resolved;
        Ok(())
    }
}
