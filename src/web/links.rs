//! Links into the gateway's app dashboard, shown when setup is incomplete

const DASHBOARD_BASE: &str = "https://www.onegraph.com/dashboard/app";

pub fn dashboard_url(app_id: &str) -> String {
    format!("{}/{}", DASHBOARD_BASE, urlencoding::encode(app_id))
}

/// Where a server-side access token can be minted for the app
pub fn server_side_token_url(app_id: &str) -> String {
    format!("{}/auth/server-side", dashboard_url(app_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_urls() {
        assert_eq!(
            dashboard_url("abc-123"),
            "https://www.onegraph.com/dashboard/app/abc-123"
        );
        assert_eq!(
            server_side_token_url("abc-123"),
            "https://www.onegraph.com/dashboard/app/abc-123/auth/server-side"
        );
    }

    #[test]
    fn test_app_id_is_encoded() {
        assert_eq!(
            dashboard_url("a b/c"),
            "https://www.onegraph.com/dashboard/app/a%20b%2Fc"
        );
    }
}
