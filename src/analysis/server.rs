#![cfg(feature = "server")]

use super::*;
use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::web;

pub struct Server;

impl Server {
    pub async fn run(api: API, bind: &str) -> Result<(), std::io::Error> {
        let api = web::Data::new(api);
        log::info!("starting HTTP server on {}", bind);
        HttpServer::new(move || {
            App::new()
                .wrap(
                    Cors::default()
                        .allow_any_origin()
                        .allow_any_method()
                        .allow_any_header(),
                )
                .app_data(api.clone())
                .route("/regions", web::get().to(regions))
                .route("/legend", web::get().to(legend))
                .route("/extent", web::get().to(extent))
                .route("/overview", web::post().to(overview))
                .route("/draw", web::post().to(draw))
        })
        .bind(bind)?
        .run()
        .await
    }
}
