//! Endpoint URL helpers shared by the vendor adapters.

/// `https://` is assumed when an endpoint has no scheme.
pub(crate) fn with_scheme(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{}", endpoint)
    }
}

/// Host part of an endpoint URL (no scheme, port or path).
pub(crate) fn host_of(endpoint: &str) -> &str {
    let rest = endpoint
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(endpoint);
    let rest = rest.split('/').next().unwrap_or(rest);
    rest.split(':').next().unwrap_or(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_scheme() {
        assert_eq!(with_scheme("obs.example.com"), "https://obs.example.com");
        assert_eq!(with_scheme(" http://minio:9000/ "), "http://minio:9000");
    }

    #[test]
    fn test_host_of() {
        assert_eq!(
            host_of("https://oss-cn-hangzhou.aliyuncs.com"),
            "oss-cn-hangzhou.aliyuncs.com"
        );
        assert_eq!(host_of("http://minio:9000/path"), "minio");
        assert_eq!(host_of("tos-cn-beijing.volces.com"), "tos-cn-beijing.volces.com");
    }
}
