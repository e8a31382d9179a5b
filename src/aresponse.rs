use rouille::Response;

pub struct AResponse {
    pub response: Response,
}

impl AResponse {
    pub fn status_code(&self) -> u16 {
        self.response.status_code
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

impl From<Response> for AResponse {
    fn from(response: Response) -> Self {
        Self { response }
    }
}
