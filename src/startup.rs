use std::net::TcpListener;

use actix_files::Files;
use actix_web::{
    dev::Server,
    middleware::Logger,
    web::{self, Data},
    App, HttpServer,
};

use crate::{
    configuration::Settings,
    routes::{default_route, login_route, process_route, upload_route},
    services::PageExtractor,
};

pub fn run(
    listener: TcpListener,
    extractor: PageExtractor,
    configuration: Settings,
) -> Result<Server, std::io::Error> {
    let extractor = Data::new(extractor);
    let scraper_settings = Data::new(configuration.scraper);
    let auth_settings = Data::new(configuration.auth);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(Files::new("/static", "./templates/static").prefer_utf8(true))
            .service(default_route::default)
            .service(
                web::scope("/app")
                    .service(login_route::login_form)
                    .service(login_route::login)
                    .service(upload_route::upload)
                    .service(process_route::process),
            )
            .app_data(extractor.clone())
            .app_data(scraper_settings.clone())
            .app_data(auth_settings.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
