//! Engine module loader backed by the package CDN.

use crate::error::FetchError;
use crate::specifier::PackageSpecifier;
use boa_engine::module::{Module, ModuleLoader, Referrer};
use boa_engine::{Context, JsError, JsNativeError, JsResult, JsString, Source};
use reqwest::Url;
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Something that can produce a module's source text for a URL.
pub trait ModuleSource {
    /// Fetches the source served at `url`.
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Fetches modules over HTTP.
///
/// Requests run on a short-lived thread so the blocking client never runs
/// inside the session's async runtime.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher with a per-request timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

impl ModuleSource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let owned = url.to_string();
        let timeout = self.timeout;
        let handle = std::thread::spawn(move || -> Result<String, FetchError> {
            let http = |source| FetchError::Http {
                url: owned.clone(),
                source,
            };
            let client = reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(http)?;
            let response = client.get(&owned).send().map_err(http)?;
            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: owned.clone(),
                    status: status.as_u16(),
                });
            }
            response.text().map_err(http)
        });
        handle.join().map_err(|_| FetchError::Interrupted {
            url: url.to_string(),
        })?
    }
}

/// Resolves and loads ES modules for one engine context.
///
/// Parsed modules are cached per URL for the lifetime of the loader.
pub struct CdnModuleLoader<S = HttpFetcher> {
    cdn_host: String,
    source: S,
    cache: RefCell<HashMap<String, Module>>,
}

impl<S: ModuleSource> CdnModuleLoader<S> {
    /// Creates a loader resolving bare packages against `cdn_host`.
    pub fn new(cdn_host: impl Into<String>, source: S) -> Self {
        Self {
            cdn_host: cdn_host.into(),
            source,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// The host bare packages resolve to.
    pub fn cdn_host(&self) -> &str {
        &self.cdn_host
    }

    /// Number of modules loaded so far.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Turns a specifier into an absolute URL.
    ///
    /// Absolute URLs are kept, bare packages map to the CDN, and anything
    /// else is joined against the importing module's URL (or the CDN root
    /// for imports made by a script).
    pub fn resolve(&self, specifier: &str, referrer: Option<&str>) -> Result<String, FetchError> {
        if let Ok(url) = Url::parse(specifier) {
            return Ok(url.into());
        }
        if let Some(package) = PackageSpecifier::parse(specifier) {
            return Ok(package.cdn_url(&self.cdn_host));
        }
        referrer
            .and_then(|r| Url::parse(r).ok())
            .or_else(|| Url::parse(&format!("https://{}/", self.cdn_host)).ok())
            .and_then(|base| base.join(specifier).ok())
            .map(String::from)
            .ok_or_else(|| FetchError::Unresolvable {
                specifier: specifier.to_string(),
            })
    }
}

fn type_error(error: FetchError) -> JsError {
    JsNativeError::typ()
        .with_message(error.js_message())
        .into()
}

impl<S: ModuleSource + 'static> ModuleLoader for CdnModuleLoader<S> {
    fn load_imported_module(
        self: Rc<Self>,
        referrer: Referrer,
        specifier: JsString,
        context: &RefCell<&mut Context>,
    ) -> impl Future<Output = JsResult<Module>> {
        let specifier = specifier.to_std_string_escaped();
        let referrer = referrer.path().map(|p| p.to_string_lossy().into_owned());

        async move {
            let url = self
                .resolve(&specifier, referrer.as_deref())
                .map_err(type_error)?;
            if let Some(module) = self.cache.borrow().get(&url) {
                return Ok(module.clone());
            }

            debug!(%url, "fetching module");
            let text = self.source.fetch(&url).map_err(type_error)?;
            let source = Source::from_bytes(text.as_bytes()).with_path(Path::new(&url));
            let module = {
                let mut ctx = context.borrow_mut();
                Module::parse(source, None, &mut *ctx)?
            };
            self.cache.borrow_mut().insert(url, module.clone());
            Ok(module)
        }
    }
}
