use service::ReviewService;

#[derive(Clone)]
pub struct ServerState {
    pub reviews: ReviewService,
}

impl ServerState {
    pub fn new(reviews: ReviewService) -> Self {
        Self { reviews }
    }
}
