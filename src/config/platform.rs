//! `[platform]` section configuration.
//!
//! Selects the mini-program dialect the build targets. Each dialect names its
//! own template and style file extensions; both can be overridden.

use serde::{Deserialize, Serialize};

/// Supported mini-program platforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformType {
    /// Alipay mini program.
    Ali,
    /// WeChat mini program.
    Wechat,
    /// ByteDance micro app (default).
    #[default]
    Bytedance,
    /// Baidu smart program.
    Baidu,
    /// Kuaishou mini program.
    Kuaishou,
}

impl PlatformType {
    /// Identifier passed to the compiler.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ali => "ali",
            Self::Wechat => "wechat",
            Self::Bytedance => "bytedance",
            Self::Baidu => "baidu",
            Self::Kuaishou => "kuaishou",
        }
    }

    /// Human-readable platform name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Ali => "Alibaba MiniApp",
            Self::Wechat => "WeChat MiniProgram",
            Self::Bytedance => "ByteDance MicroApp",
            Self::Baidu => "Baidu SmartProgram",
            Self::Kuaishou => "Kuaishou MiniProgram",
        }
    }

    /// Template markup extension, including the leading dot.
    pub const fn template_ext(self) -> &'static str {
        match self {
            Self::Ali => ".axml",
            Self::Wechat => ".wxml",
            Self::Bytedance => ".ttml",
            Self::Baidu => ".swan",
            Self::Kuaishou => ".ksml",
        }
    }

    /// Stylesheet extension, including the leading dot.
    pub const fn style_ext(self) -> &'static str {
        match self {
            Self::Ali => ".acss",
            Self::Wechat => ".wxss",
            Self::Bytedance => ".ttss",
            Self::Baidu | Self::Kuaishou => ".css",
        }
    }
}

/// `[platform]` section in raxmini.toml.
///
/// # Example
/// ```toml
/// [platform]
/// type = "wechat"
/// style = ".css"   # override the preset
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformConfig {
    /// Target platform preset.
    pub r#type: PlatformType,

    /// Override for the human-readable name.
    pub name: Option<String>,

    /// Override for the template extension (e.g. `.ttml`).
    pub template: Option<String>,

    /// Override for the style extension (e.g. `.ttss`).
    pub style: Option<String>,
}

impl PlatformConfig {
    /// Resolve the preset and overrides into an immutable descriptor.
    pub fn descriptor(&self) -> Platform {
        let ty = self.r#type;
        Platform {
            r#type: ty.as_str().to_owned(),
            name: self
                .name
                .clone()
                .unwrap_or_else(|| ty.display_name().to_owned()),
            extension: PlatformExtension {
                xml: self
                    .template
                    .clone()
                    .unwrap_or_else(|| ty.template_ext().to_owned()),
                css: self
                    .style
                    .clone()
                    .unwrap_or_else(|| ty.style_ext().to_owned()),
            },
        }
    }
}

/// Platform descriptor handed to the compiler and used to name outputs.
///
/// Serializes to the shape the JSX compiler expects:
/// `{ "type": "bytedance", "name": "...", "extension": { "xml": ".ttml", "css": ".ttss" } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub r#type: String,
    pub name: String,
    pub extension: PlatformExtension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformExtension {
    /// Template markup extension
    pub xml: String,
    /// Stylesheet extension
    pub css: String,
}

impl Platform {
    #[inline]
    pub fn template_ext(&self) -> &str {
        &self.extension.xml
    }

    #[inline]
    pub fn style_ext(&self) -> &str {
        &self.extension.css
    }
}

impl Default for Platform {
    fn default() -> Self {
        PlatformConfig::default().descriptor()
    }
}

#[cfg(test)]
mod tests {
    use super::super::ProjectConfig;
    use super::*;

    #[test]
    fn test_default_platform_is_bytedance() {
        let platform = Platform::default();
        assert_eq!(platform.r#type, "bytedance");
        assert_eq!(platform.name, "ByteDance MicroApp");
        assert_eq!(platform.template_ext(), ".ttml");
        assert_eq!(platform.style_ext(), ".ttss");
    }

    #[test]
    fn test_platform_presets() {
        let config: ProjectConfig = toml::from_str(
            r#"
            [platform]
            type = "wechat"
        "#,
        )
        .unwrap();
        let platform = config.platform.descriptor();
        assert_eq!(platform.template_ext(), ".wxml");
        assert_eq!(platform.style_ext(), ".wxss");

        assert_eq!(PlatformType::Ali.template_ext(), ".axml");
        assert_eq!(PlatformType::Baidu.style_ext(), ".css");
        assert_eq!(PlatformType::Kuaishou.template_ext(), ".ksml");
    }

    #[test]
    fn test_platform_overrides() {
        let config: ProjectConfig = toml::from_str(
            r#"
            [platform]
            type = "ali"
            name = "Custom"
            style = ".less"
        "#,
        )
        .unwrap();
        let platform = config.platform.descriptor();
        assert_eq!(platform.name, "Custom");
        assert_eq!(platform.template_ext(), ".axml");
        assert_eq!(platform.style_ext(), ".less");
    }

    #[test]
    fn test_platform_serializes_compiler_shape() {
        let json = serde_json::to_value(Platform::default()).unwrap();
        assert_eq!(json["type"], "bytedance");
        assert_eq!(json["extension"]["xml"], ".ttml");
        assert_eq!(json["extension"]["css"], ".ttss");
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let result: Result<ProjectConfig, _> = toml::from_str(
            r#"
            [platform]
            type = "nokia"
        "#,
        );
        assert!(result.is_err());
    }
}
