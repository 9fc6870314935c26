use actix_web::{
    http::header::{CACHE_CONTROL, LOCATION, USER_AGENT},
    web, HttpRequest, HttpResponse, Responder,
};
use log::{debug, info, warn};

use crate::{
    repositories::LinkRepositoryTrait,
    services::{LinkService, LinkServiceTrait},
    types::Result,
    utils::{html, qr},
};

/// Rendered size of the desktop QR code, in pixels
const QR_SIZE: u32 = 200;

const MOBILE_AGENTS: [&str; 7] = [
    "iphone",
    "ipad",
    "ipod",
    "android",
    "webos",
    "blackberry",
    "windows phone",
];

pub fn is_mobile_agent(user_agent: &str) -> bool {
    let agent = user_agent.to_ascii_lowercase();
    MOBILE_AGENTS.iter().any(|needle| agent.contains(needle))
}

fn qr_page(url: &str, qr_uri: &str) -> String {
    let url = html::escape(url);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Scan to open</title>
</head>
<body>
<h1>Scan to open</h1>
<img src="{qr_uri}" width="{QR_SIZE}" height="{QR_SIZE}" alt="QR code">
<p>Destination: <a href="{url}">{url}</a></p>
</body>
</html>
"#
    )
}

/// Plain fallback for destinations that do not fit in a QR code.
fn landing_page(url: &str) -> String {
    let url = html::escape(url);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Short link</title>
</head>
<body>
<h1>Open link</h1>
<p>This short link points to: <a href="{url}">{url}</a></p>
</body>
</html>
"#
    )
}

/// Redirect route handler
///
/// Phones and tablets get a plain redirect; desktop browsers get a page with
/// a QR code of the destination to scan with a phone.
pub async fn redirect_handler<R: LinkRepositoryTrait + 'static>(
    req: HttpRequest,
    path: web::Path<String>,
    service: web::Data<LinkService<R>>,
) -> Result<impl Responder> {
    let key = path.into_inner();
    debug!("Redirect requested for key: {}", key);

    let link = service.record_click(&key).await?;

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if is_mobile_agent(user_agent) {
        info!("Redirecting '{}' to '{}'", key, link.url);
        return Ok(HttpResponse::Found()
            .insert_header((LOCATION, link.url))
            .insert_header((CACHE_CONTROL, "no-cache"))
            .finish());
    }

    let page = match qr::svg_data_uri(&link.url, QR_SIZE) {
        Ok(qr_uri) => {
            info!("Serving QR page for '{}'", key);
            qr_page(&link.url, &qr_uri)
        }
        Err(e) => {
            warn!("QR encoding failed for '{}': {}", key, e);
            landing_page(&link.url)
        }
    };

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .insert_header((CACHE_CONTROL, "no-cache"))
        .body(page))
}
