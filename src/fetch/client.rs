use reqwest::blocking::{Request, Response};

/// Executes a single blocking HTTP request.
///
/// The seam lets callers stack header injection on top of the real client
/// and lets tests script responses without a network.
pub trait HttpClient {
    fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

impl<C: HttpClient + ?Sized> HttpClient for Box<C> {
    fn execute(&self, req: Request) -> reqwest::Result<Response> {
        (**self).execute(req)
    }
}
