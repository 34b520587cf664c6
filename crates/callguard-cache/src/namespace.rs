use url::Url;

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "svg", "ico", "avif", "bmp",
];

/// Kind of asset a URL points at; each kind has its own namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetClass {
    /// Scripts, styles, documents and anything not otherwise classified.
    Static,
    /// Responses under an `/api/` path.
    Api,
    Image,
}

impl AssetClass {
    pub const ALL: [AssetClass; 3] = [AssetClass::Static, AssetClass::Api, AssetClass::Image];

    /// Classifies a normalized URL by path.
    pub fn of(url: &Url) -> Self {
        let path = url.path();
        if path.starts_with("/api/") || path == "/api" {
            return AssetClass::Api;
        }

        let extension = path
            .rsplit('/')
            .next()
            .and_then(|segment| segment.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());
        match extension {
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => AssetClass::Image,
            _ => AssetClass::Static,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Static => "static",
            AssetClass::Api => "api",
            AssetClass::Image => "images",
        }
    }
}

/// Names of the namespaces belonging to one cache generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNamespaces {
    prefix: String,
    version: String,
}

impl CacheNamespaces {
    pub fn new(prefix: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            version: version.into(),
        }
    }

    /// `<prefix>-<class>-<version>`.
    pub fn name(&self, class: AssetClass) -> String {
        format!("{}-{}-{}", self.prefix, class.as_str(), self.version)
    }

    /// Every namespace of the current generation.
    pub fn current(&self) -> Vec<String> {
        AssetClass::ALL.iter().map(|&class| self.name(class)).collect()
    }

    pub fn is_current(&self, namespace: &str) -> bool {
        AssetClass::ALL
            .iter()
            .any(|&class| self.name(class) == namespace)
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}
