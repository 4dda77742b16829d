pub(crate) mod helpers {
    use forum_core::entities::{Answer, Question, User};
    use forum_core::input::{NewQuestion, PostText, Registration};

    use crate::service::ForumService;

    pub const TEST_PASSWORD: &str = "hunter2hunter2";

    /// Create an in-memory service with migrations applied.
    pub async fn test_service() -> ForumService {
        ForumService::new_local(":memory:").await.unwrap()
    }

    pub async fn create_test_user(svc: &ForumService, username: &str) -> User {
        let registration = Registration::parse(username, TEST_PASSWORD, TEST_PASSWORD).unwrap();
        svc.register_user(&registration).await.unwrap()
    }

    /// Create a question tagged `test`.
    pub async fn create_test_question(svc: &ForumService, author_id: i64, title: &str) -> Question {
        let new = NewQuestion::parse(title, "body", "test").unwrap();
        svc.create_question(author_id, &new).await.unwrap()
    }

    pub async fn create_test_answer(svc: &ForumService, question_id: i64, author_id: i64) -> Answer {
        let body = PostText::parse("body", "an answer").unwrap();
        svc.create_answer(question_id, author_id, &body).await.unwrap()
    }
}
