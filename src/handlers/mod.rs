pub mod commissions;
pub mod designers;
pub mod disputes;
pub mod orders;

use actix_web::web;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Order routes: intake, shortlist, offers, assignment, progress ──
    cfg.service(
        web::scope("/orders")
            .route("", web::post().to(orders::create_order))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}/shortlist", web::post().to(orders::shortlist))
            .route("/{id}/offer", web::post().to(orders::offer))
            .route("/{id}/accept", web::post().to(orders::accept))
            .route("/{id}/decline", web::post().to(orders::decline))
            .route("/{id}/assign", web::post().to(orders::admin_assign))
            .route("/{id}/status", web::put().to(orders::update_status))
            .route("/{id}/rating", web::post().to(orders::rate))
            .route(
                "/{id}/recommended-designers",
                web::get().to(orders::recommended_designers),
            ),
    );

    // ── Designer routes: profile, availability, commission ledger ──
    cfg.service(
        web::scope("/designers")
            .route("", web::post().to(designers::register))
            .route("/{id}", web::get().to(designers::get_designer))
            .route("/{id}/status", web::put().to(designers::update_status))
            .route("/{id}/capacity", web::put().to(designers::update_capacity))
            .route("/{id}/commission", web::get().to(commissions::summary))
            .route(
                "/{id}/commission-payments",
                web::post().to(commissions::submit_payment),
            ),
    );
    cfg.service(
        web::resource("/commission-payments/{id}/review")
            .route(web::put().to(commissions::review_payment)),
    );

    // ── Dispute routes ──
    cfg.service(
        web::scope("/disputes")
            .route("", web::post().to(disputes::file))
            .route("/{id}", web::get().to(disputes::get_dispute))
            .route("/{id}/response", web::post().to(disputes::respond))
            .route("/{id}/evidence", web::post().to(disputes::add_evidence))
            .route("/{id}/notes", web::post().to(disputes::add_note))
            .route("/{id}/resolve", web::post().to(disputes::resolve)),
    );
}
