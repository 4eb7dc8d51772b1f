//! 运行时配置
//!
//! 启动时解析一次，每个键独立回退到默认值。

/// LocalStorage 中覆盖后端地址的键
pub const API_BASE_URL_KEY: &str = "api_base_url";

const LOCAL_API_BASE_URL: &str = "http://localhost:8001";
const DEPLOYED_API_BASE_URL: &str = "https://rakshitjan-promotional-backend.hf.space";
const DEFAULT_HEALTH_POLL_INTERVAL_MS: u32 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub health_poll_interval_ms: u32,
}

/// 解析所需的外部输入
#[derive(Debug, Clone, Default)]
pub struct ConfigSources<'a> {
    /// LocalStorage 覆盖值
    pub stored_base_url: Option<String>,
    /// 编译期 `LOYALTY_API_BASE_URL`
    pub build_base_url: Option<&'a str>,
    /// 页面所在主机名
    pub hostname: Option<String>,
}

impl AppConfig {
    pub fn resolve(sources: ConfigSources<'_>) -> Self {
        let non_blank = |s: &str| !s.trim().is_empty();

        let api_base_url = sources
            .stored_base_url
            .filter(|s| non_blank(s))
            .or_else(|| {
                sources
                    .build_base_url
                    .filter(|s| non_blank(s))
                    .map(str::to_string)
            })
            .unwrap_or_else(|| {
                let local = matches!(
                    sources.hostname.as_deref(),
                    Some("localhost") | Some("127.0.0.1")
                );
                if local {
                    LOCAL_API_BASE_URL.to_string()
                } else {
                    DEPLOYED_API_BASE_URL.to_string()
                }
            });

        Self {
            api_base_url: api_base_url.trim().trim_end_matches('/').to_string(),
            health_poll_interval_ms: DEFAULT_HEALTH_POLL_INTERVAL_MS,
        }
    }

    /// 从浏览器环境加载
    pub fn from_browser() -> Self {
        let hostname = web_sys::window().and_then(|w| w.location().hostname().ok());
        let config = Self::resolve(ConfigSources {
            stored_base_url: crate::web::LocalStorage::get(API_BASE_URL_KEY),
            build_base_url: option_env!("LOYALTY_API_BASE_URL"),
            hostname,
        });
        log_info!("[Config] API base URL: {}", config.api_base_url);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_override_wins() {
        let config = AppConfig::resolve(ConfigSources {
            stored_base_url: Some("https://staging.example.com/".into()),
            build_base_url: Some("https://build.example.com"),
            hostname: Some("localhost".into()),
        });
        assert_eq!(config.api_base_url, "https://staging.example.com");
    }

    #[test]
    fn build_value_beats_host_detection() {
        let config = AppConfig::resolve(ConfigSources {
            stored_base_url: Some("  ".into()),
            build_base_url: Some("https://build.example.com"),
            hostname: Some("localhost".into()),
        });
        assert_eq!(config.api_base_url, "https://build.example.com");
    }

    #[test]
    fn host_decides_between_local_and_deployed() {
        for host in ["localhost", "127.0.0.1"] {
            let config = AppConfig::resolve(ConfigSources {
                hostname: Some(host.into()),
                ..Default::default()
            });
            assert_eq!(config.api_base_url, LOCAL_API_BASE_URL);
        }

        let config = AppConfig::resolve(ConfigSources {
            hostname: Some("console.example.com".into()),
            ..Default::default()
        });
        assert_eq!(config.api_base_url, DEPLOYED_API_BASE_URL);
        assert_eq!(config.health_poll_interval_ms, 30_000);
    }
}
