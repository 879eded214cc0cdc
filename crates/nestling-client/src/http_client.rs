use reqwest::Client;

const DISABLE_SYSTEM_PROXY_ENV: &str = "NESTLING_DISABLE_SYSTEM_PROXY";

/// The refresh marker travels as an HttpOnly cookie, so every client
/// carries a cookie store.
pub(crate) fn build_http_client() -> Client {
    let builder = Client::builder().cookie_store(true);
    let builder = if should_disable_system_proxy() {
        builder.no_proxy()
    } else {
        builder
    };
    builder.build().expect("Failed to build reqwest client")
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}
