//! HTTP handler functions for the rule map API.

use actix_web::{HttpResponse, web};
use rule_map_render::{render_with, to_feature_collection};
use rule_map_rule_models::{Rule, Segment, SegmentSelection, SelectionError};
use rule_map_server_models::{
    ApiHealth, ApiLocations, ApiRules, ApiSegment, ApiSites, LocationsQueryParams,
    RulesQueryParams,
};
use rule_map_sites::jerusalem;
use rule_map_store::{StoreError, available_locations};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/segments`
///
/// Lists the seven segments and whether each has a rule table.
pub async fn segments(state: web::Data<AppState>) -> HttpResponse {
    let segments: Vec<ApiSegment> = state
        .store
        .available_segments()
        .into_iter()
        .map(|(segment, available)| ApiSegment::new(segment, available))
        .collect();

    HttpResponse::Ok().json(segments)
}

/// `GET /api/sites`
///
/// Returns the site registry and default map view.
pub async fn sites() -> HttpResponse {
    let registry = jerusalem();
    HttpResponse::Ok().json(ApiSites {
        city: registry.city().to_string(),
        view: registry.view(),
        sites: registry.sites().to_vec(),
    })
}

/// `GET /api/legend`
pub async fn legend() -> HttpResponse {
    HttpResponse::Ok().json(rule_map_render::legend())
}

/// `GET /api/locations`
///
/// Lists the location dropdown values for the selected segment.
pub async fn locations(
    state: web::Data<AppState>,
    params: web::Query<LocationsQueryParams>,
) -> HttpResponse {
    let segment = match resolve_segment(params.selection()) {
        Ok(segment) => segment,
        Err(response) => return response,
    };
    let rules = match load_rules(&state, segment).await {
        Ok(rules) => rules,
        Err(response) => return response,
    };

    let field = params.field.unwrap_or_default();
    HttpResponse::Ok().json(ApiLocations {
        segment,
        field,
        locations: available_locations(&rules, field),
    })
}

/// `GET /api/rules`
///
/// Loads the selected segment's table, filters it, and returns the display
/// table and map primitives.
pub async fn rules(
    state: web::Data<AppState>,
    params: web::Query<RulesQueryParams>,
) -> HttpResponse {
    let segment = match resolve_segment(params.selection()) {
        Ok(segment) => segment,
        Err(response) => return response,
    };
    let rules = match load_rules(&state, segment).await {
        Ok(rules) => rules,
        Err(response) => return response,
    };

    let criteria = params.criteria();
    let rendered = render_with(
        &rules,
        &criteria,
        &params.display_options(),
        jerusalem(),
    );

    HttpResponse::Ok().json(ApiRules::new(segment, criteria, rendered))
}

/// `GET /api/rules.geojson`
///
/// Same filters as `/api/rules`, returning only the map as a `GeoJSON`
/// feature collection.
pub async fn rules_geojson(
    state: web::Data<AppState>,
    params: web::Query<RulesQueryParams>,
) -> HttpResponse {
    let segment = match resolve_segment(params.selection()) {
        Ok(segment) => segment,
        Err(response) => return response,
    };
    let rules = match load_rules(&state, segment).await {
        Ok(rules) => rules,
        Err(response) => return response,
    };

    let rendered = render_with(
        &rules,
        &params.criteria(),
        &params.display_options(),
        jerusalem(),
    );
    let collection = to_feature_collection(&rendered.map_primitives);

    match serde_json::to_string(&collection) {
        Ok(body) => HttpResponse::Ok()
            .content_type("application/geo+json")
            .body(body),
        Err(e) => {
            log::error!("Failed to serialize GeoJSON: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to serialize GeoJSON"
            }))
        }
    }
}

/// Resolves the dropdowns to one segment, or the response to send instead.
fn resolve_segment(
    selection: Result<SegmentSelection, SelectionError>,
) -> Result<Segment, HttpResponse> {
    selection
        .and_then(|selection| selection.resolve())
        .map_err(|e| match e {
            SelectionError::MultipleSegments { .. } => {
                log::warn!("Rejected request: {e}");
                HttpResponse::BadRequest().json(serde_json::json!({
                    "warning": e.to_string()
                }))
            }
            SelectionError::UnknownChoice { .. } => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": e.to_string()
                }))
            }
        })
}

/// Reads the segment's table off the async executor.
async fn load_rules(
    state: &web::Data<AppState>,
    segment: Segment,
) -> Result<Vec<Rule>, HttpResponse> {
    let store = state.store.clone();

    match web::block(move || store.load(segment)).await {
        Ok(Ok(rules)) => Ok(rules),
        Ok(Err(e @ StoreError::NotFound { .. })) => {
            Err(HttpResponse::NotFound().json(serde_json::json!({
                "error": e.to_string()
            })))
        }
        Ok(Err(e)) => {
            log::error!("Failed to load rule table for {segment}: {e}");
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Failed to load rule table: {e}")
            })))
        }
        Err(e) => {
            log::error!("Rule table load for {segment} was cancelled: {e}");
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to load rule table"
            })))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use actix_web::{App, http::StatusCode, test};
    use rule_map_store::RuleStore;
    use rule_map_store::paths::TableFormat;

    use super::*;
    use crate::configure;

    const TABLE: &str = "From,To,Support,Confidence,Lift\n\
        שער יפו,הכותל המערבי,0.12,0.75,1.3\n\
        הכותל המערבי,הרובע היהודי,0.31,0.82,1.9\n\
        Unknown Place,כנסיית הקבר,0.2,0.6,1.4\n\
        ממילא,שער יפו,0.02,0.3,0.9\n";

    /// A scratch data directory under the system temp dir, removed on drop.
    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn with_all_table(name: &str) -> Self {
            let dir = std::env::temp_dir()
                .join(format!("rule_map_server_{name}_{}", std::process::id()));
            std::fs::create_dir_all(&dir).unwrap();
            let store = RuleStore::new(&dir);
            std::fs::write(store.table_path(Segment::All, TableFormat::Csv), TABLE).unwrap();
            Self(dir)
        }

        fn state(&self) -> web::Data<AppState> {
            web::Data::new(AppState {
                store: RuleStore::new(&self.0),
            })
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.0).ok();
        }
    }

    #[actix_web::test]
    async fn renders_rules_for_default_segment() {
        let scratch = ScratchDir::with_all_table("render");
        let app =
            test::init_service(App::new().app_data(scratch.state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/rules").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["segment"], "all");
        assert_eq!(body["summary"]["loaded"], 4);
        assert_eq!(body["summary"]["filtered"], 3);
        assert_eq!(body["summary"]["mapped"], 2);
        assert_eq!(body["rows"][0]["supportPct"], "31.0%");
        assert_eq!(body["mapPrimitives"][0]["color"], "red");
    }

    #[actix_web::test]
    async fn applies_thresholds_and_location() {
        let scratch = ScratchDir::with_all_table("filter");
        let app =
            test::init_service(App::new().app_data(scratch.state()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/rules?minSupport=0.05&minConfidence=0.8")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["rows"].as_array().unwrap().len(), 1);
        assert_eq!(body["mapPrimitives"][0]["color"], "#800000");

        let req = test::TestRequest::get()
            .uri("/api/rules?minConfidence=0.9")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["rows"].as_array().unwrap().is_empty());
        assert!(body["mapPrimitives"].as_array().unwrap().is_empty());
        assert!(body["notice"].is_string());
    }

    #[actix_web::test]
    async fn rejects_multiple_segments() {
        let scratch = ScratchDir::with_all_table("multiple");
        let app =
            test::init_service(App::new().app_data(scratch.state()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/rules?age=young&religion=jewish")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert!(body["warning"].is_string());
        assert!(body.get("rows").is_none());
    }

    #[actix_web::test]
    async fn missing_table_is_not_found() {
        let scratch = ScratchDir::with_all_table("missing");
        let app =
            test::init_service(App::new().app_data(scratch.state()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/rules?continent=Europe")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn lists_locations_and_segments() {
        let scratch = ScratchDir::with_all_table("locations");
        let app =
            test::init_service(App::new().app_data(scratch.state()).configure(configure)).await;

        let req = test::TestRequest::get()
            .uri("/api/locations?field=from")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["locations"].as_array().unwrap().len(), 4);

        let req = test::TestRequest::get().uri("/api/segments").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let segments = body.as_array().unwrap();
        assert_eq!(segments.len(), 7);
        assert_eq!(segments[0]["available"], true);
        assert_eq!(segments[1]["available"], false);
    }

    #[actix_web::test]
    async fn serves_geojson() {
        let scratch = ScratchDir::with_all_table("geojson");
        let app =
            test::init_service(App::new().app_data(scratch.state()).configure(configure)).await;

        let req = test::TestRequest::get().uri("/api/rules.geojson").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"].as_array().unwrap().len(), 4);
    }
}
