use std::time::Duration;

use crate::models::settings::{ProxySettings, ResolverSettings};

pub fn proxy_url(proxy: &ProxySettings) -> Option<String> {
    if !proxy.enabled || proxy.host.is_empty() {
        return None;
    }
    let scheme = match proxy.proxy_type.as_str() {
        "socks5" => "socks5",
        "https" => "https",
        _ => "http",
    };
    if !proxy.username.is_empty() {
        Some(format!(
            "{}://{}:{}@{}:{}",
            scheme, proxy.username, proxy.password, proxy.host, proxy.port
        ))
    } else {
        Some(format!("{}://{}:{}", scheme, proxy.host, proxy.port))
    }
}

pub fn apply_proxy(
    builder: reqwest::ClientBuilder,
    proxy: &ProxySettings,
) -> reqwest::ClientBuilder {
    let Some(url) = proxy_url(proxy) else {
        return builder;
    };
    match reqwest::Proxy::all(&url) {
        Ok(p) => builder.proxy(p),
        Err(e) => {
            tracing::warn!("Invalid proxy URL: {}", e);
            builder
        }
    }
}

pub fn build_client(
    resolver: &ResolverSettings,
    proxy: &ProxySettings,
) -> anyhow::Result<reqwest::Client> {
    let builder = reqwest::Client::builder()
        .user_agent(&resolver.user_agent)
        .timeout(Duration::from_secs(resolver.request_timeout_secs))
        .connect_timeout(Duration::from_secs(resolver.connect_timeout_secs))
        .cookie_store(true);
    let client = apply_proxy(builder, proxy).build()?;
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(enabled: bool, proxy_type: &str, user: &str) -> ProxySettings {
        ProxySettings {
            enabled,
            proxy_type: proxy_type.into(),
            host: "127.0.0.1".into(),
            port: 9050,
            username: user.into(),
            password: if user.is_empty() { String::new() } else { "pw".into() },
        }
    }

    #[test]
    fn disabled_proxy_has_no_url() {
        assert_eq!(proxy_url(&proxy(false, "http", "")), None);
    }

    #[test]
    fn socks_proxy_with_credentials() {
        assert_eq!(
            proxy_url(&proxy(true, "socks5", "me")).as_deref(),
            Some("socks5://me:pw@127.0.0.1:9050")
        );
    }

    #[test]
    fn unknown_type_falls_back_to_http() {
        assert_eq!(
            proxy_url(&proxy(true, "ftp", "")).as_deref(),
            Some("http://127.0.0.1:9050")
        );
    }

    #[test]
    fn client_builds_from_defaults() {
        let client = build_client(&ResolverSettings::default(), &ProxySettings::default());
        assert!(client.is_ok());
    }
}
