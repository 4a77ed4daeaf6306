use actix_web::web;

/// Builds a test service wired like `main`, over the given pool.
#[cfg(test)]
macro_rules! test_app {
    ($pool:expr) => {{
        let config = crate::config::Config::for_tests();
        let signer = crate::csrf::CsrfSigner::new(&config.secret_key);
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new(config))
                .app_data(actix_web::web::Data::new(signer))
                .configure(crate::handlers::configure),
        )
        .await
    }};
}

pub mod cafes;
pub mod pages;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(pages::home))
        .route("/add", web::post().to(pages::add_cafe))
        .route("/random", web::get().to(cafes::get_random_cafe))
        .route("/all", web::get().to(cafes::get_all_cafes))
        .route("/search", web::get().to(cafes::search_cafes))
        .service(
            web::resource("/update-price/{cafe_name}")
                .route(web::patch().to(cafes::update_price))
                .route(web::post().to(cafes::update_price)),
        )
        .service(
            web::resource("/delete/{cafe_name}")
                .route(web::delete().to(cafes::delete_cafe))
                .route(web::post().to(cafes::delete_cafe)),
        );
}
