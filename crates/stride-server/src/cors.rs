use http::Method;
use http::header::HeaderName;
use stride_config::{AnyOrList, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

const METHODS: [Method; 5] = [Method::GET, Method::POST, Method::PATCH, Method::DELETE, Method::OPTIONS];

/// Build a Tower CORS layer from configuration
///
/// With credentials enabled a wildcard is answered by mirroring the request,
/// since browsers reject `*` on credentialed requests.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new().allow_methods(METHODS);

    // Origins
    layer = match &config.origins {
        AnyOrList::Any if config.credentials => layer.allow_origin(AllowOrigin::mirror_request()),
        AnyOrList::Any => layer.allow_origin(AllowOrigin::any()),
        AnyOrList::List(origins) => {
            let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            layer.allow_origin(origins)
        }
    };

    // Headers
    layer = match &config.headers {
        AnyOrList::Any if config.credentials => layer.allow_headers(AllowHeaders::mirror_request()),
        AnyOrList::Any => layer.allow_headers(AllowHeaders::any()),
        AnyOrList::List(headers) => {
            let headers: Vec<HeaderName> = headers.iter().filter_map(|h| h.parse().ok()).collect();
            layer.allow_headers(headers)
        }
    };

    if config.credentials {
        layer = layer.allow_credentials(true);
    }

    if let Some(duration) = config.max_age_duration() {
        layer = layer.max_age(duration);
    }

    layer
}
