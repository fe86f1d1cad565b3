use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use salus_rs::Error;
use std::io::Cursor;

#[derive(Debug)]
pub enum ExporterError {
    Salus(Error),
    Format,
}

impl From<Error> for ExporterError {
    fn from(error: Error) -> Self {
        ExporterError::Salus(error)
    }
}

fn html(status: Status, title: &str, detail: &str) -> response::Result<'static> {
    let body = format!(
        "<html><body><h3>{} {}</h3><code>{}</code></body></html>",
        status.code, title, detail
    );
    Response::build()
        .status(status)
        .sized_body(body.len(), Cursor::new(body))
        .header(ContentType::new("text", "html"))
        .ok()
}

impl<'r> Responder<'r, 'static> for ExporterError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        match &self {
            ExporterError::Salus(e @ Error::Authentication(_)) => {
                html(Status::Forbidden, "Forbidden", &e.to_string())
            }
            ExporterError::Salus(e @ Error::Timeout(_)) => {
                html(Status::GatewayTimeout, "Gateway Timeout", &e.to_string())
            }
            ExporterError::Salus(e @ Error::Network(_))
            | ExporterError::Salus(e @ Error::Parse { .. }) => {
                html(Status::BadGateway, "Bad Gateway", &e.to_string())
            }
            _ => html(
                Status::InternalServerError,
                "Unknown exception",
                &format!("{:?}", self),
            ),
        }
    }
}
