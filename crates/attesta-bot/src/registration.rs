//! Per-conversation registration state machine.
//!
//! State lives in memory keyed by chat id. Idle conversations are
//! evicted after a TTL so abandoned flows don't accumulate forever.
//! Database access goes through the `Directory` seam so the transitions
//! are testable without Postgres.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use attesta_core::{Result, Role};

/// Lookup/binding operations the flow needs from the records backend.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Whether this external chat id already completed registration.
    async fn chat_registered(&self, chat_id: i64) -> Result<bool>;

    /// Case-insensitive exact match on (last, first, patronymic) within
    /// the chosen role's table. Returns the principal id.
    async fn find_by_full_name(
        &self,
        role: Role,
        last_name: &str,
        first_name: &str,
        patronymic: &str,
    ) -> Result<Option<i64>>;

    /// Hash the password, bind the chat handle (reusing an existing row
    /// for this chat id), mark students verified, and return the login.
    async fn bind_credentials(
        &self,
        role: Role,
        principal_id: i64,
        password: &str,
        chat_id: i64,
    ) -> Result<Option<String>>;
}

/// Where one chat currently stands in the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversation {
    ChoosingRole,
    EnteringFullName { role: Role },
    EnteringPassword { role: Role, principal_id: i64 },
}

/// What the dispatcher should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Welcome text with the student/curator role keyboard attached.
    RoleKeyboard(String),
}

pub struct Registration<D> {
    directory: D,
    ttl: Duration,
    conversations: HashMap<i64, (Conversation, Instant)>,
}

impl<D: Directory> Registration<D> {
    pub fn new(directory: D, ttl: Duration) -> Self {
        Self {
            directory,
            ttl,
            conversations: HashMap::new(),
        }
    }

    /// Current state of a chat, if any. Mostly for tests.
    pub fn state(&self, chat_id: i64) -> Option<&Conversation> {
        self.conversations.get(&chat_id).map(|(state, _)| state)
    }

    /// Drop conversations idle longer than the TTL.
    pub fn evict_stale(&mut self) {
        let ttl = self.ttl;
        let before = self.conversations.len();
        self.conversations
            .retain(|_, (_, touched)| touched.elapsed() < ttl);
        let evicted = before - self.conversations.len();
        if evicted > 0 {
            tracing::debug!(evicted, "stale bot conversations dropped");
        }
    }

    fn set_state(&mut self, chat_id: i64, state: Conversation) {
        self.conversations.insert(chat_id, (state, Instant::now()));
    }

    fn clear(&mut self, chat_id: i64) {
        self.conversations.remove(&chat_id);
    }

    /// `/start`: short-circuit for already-bound chats, otherwise open
    /// the flow with the role keyboard.
    pub async fn start(&mut self, chat_id: i64, first_name: &str) -> Reply {
        self.clear(chat_id);

        match self.directory.chat_registered(chat_id).await {
            Ok(true) => return Reply::Text("✅ Вы уже зарегистрированы!".to_string()),
            Ok(false) => {}
            Err(e) => {
                tracing::error!(chat_id, "registration lookup failed: {e}");
                return Reply::Text("❌ Сервис временно недоступен. Попробуйте позже.".to_string());
            }
        }

        self.set_state(chat_id, Conversation::ChoosingRole);
        let name = if first_name.is_empty() { "друг" } else { first_name };
        Reply::RoleKeyboard(format!(
            "🌟 <b>Добро пожаловать в Навигатор Промежуточной Аттестации, {name}</b>! 🌟\n\n\
             📚 Здесь вы сможете зарегистрироваться и начать работу.\n\n\
             🙋 Пожалуйста, выберите свою роль, чтобы продолжить:"
        ))
    }

    /// Role button pressed. Ignored unless the chat is choosing a role.
    pub async fn on_callback(&mut self, chat_id: i64, data: &str) -> Option<Reply> {
        match self.state(chat_id) {
            Some(Conversation::ChoosingRole) => {}
            _ => return None,
        }
        let role = match data {
            "role_student" => Role::Student,
            "role_curator" => Role::Curator,
            _ => return None,
        };
        self.set_state(chat_id, Conversation::EnteringFullName { role });
        Some(Reply::Text(
            "✍️ Введите своё ФИО (например: Иванов Иван Иванович)".to_string(),
        ))
    }

    /// Free-text message while a flow is active.
    pub async fn on_message(&mut self, chat_id: i64, text: &str) -> Option<Reply> {
        let state = self.state(chat_id)?.clone();
        match state {
            // Role is picked with the keyboard; plain text is ignored.
            Conversation::ChoosingRole => None,
            Conversation::EnteringFullName { role } => {
                Some(self.handle_full_name(chat_id, role, text).await)
            }
            Conversation::EnteringPassword { role, principal_id } => {
                Some(self.handle_password(chat_id, role, principal_id, text).await)
            }
        }
    }

    async fn handle_full_name(&mut self, chat_id: i64, role: Role, text: &str) -> Reply {
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() != 3 {
            // Stay in state, re-prompt.
            self.set_state(chat_id, Conversation::EnteringFullName { role });
            return Reply::Text(
                "<b>❌ ФИО набрано неверно</b>. Пожалуйста, попробуйте написать снова.\n\n\
                 Убедитесь, что вы ввели фамилию, имя и отчество через пробел.\n\
                 Например: Иванов Иван Иванович"
                    .to_string(),
            );
        }

        let (last_name, first_name, patronymic) = (parts[0], parts[1], parts[2]);
        match self
            .directory
            .find_by_full_name(role, last_name, first_name, patronymic)
            .await
        {
            Ok(Some(principal_id)) => {
                self.set_state(chat_id, Conversation::EnteringPassword { role, principal_id });
                Reply::Text("🔐 Введите пароль (минимум 4 символа):".to_string())
            }
            Ok(None) => {
                // Abort: no retry loop back to role choice.
                self.clear(chat_id);
                let who = match role {
                    Role::Curator => "Куратор",
                    _ => "Студент",
                };
                Reply::Text(format!(
                    "❌ {who} не найден. Проверьте ФИО и начните заново командой /start."
                ))
            }
            Err(e) => {
                tracing::error!(chat_id, "full-name lookup failed: {e}");
                self.clear(chat_id);
                Reply::Text("❌ Не удалось выполнить поиск. Попробуйте позже.".to_string())
            }
        }
    }

    async fn handle_password(
        &mut self,
        chat_id: i64,
        role: Role,
        principal_id: i64,
        text: &str,
    ) -> Reply {
        let password = text.trim();
        if password.chars().count() < 4 {
            self.set_state(chat_id, Conversation::EnteringPassword { role, principal_id });
            return Reply::Text("⚠️ Пароль должен содержать не менее 4 символов.".to_string());
        }

        match self
            .directory
            .bind_credentials(role, principal_id, password, chat_id)
            .await
        {
            Ok(login) => {
                self.clear(chat_id);
                let login = login.unwrap_or_else(|| "не задан".to_string());
                tracing::info!(chat_id, %login, "registration completed");
                Reply::Text(format!(
                    "🌟 Регистрация прошла успешно! 🌟\n\n\
                     Мы зарегистрировали вас в системе. Вот ваши данные:\n\
                     Ваш логин: <b>{login}</b>\n\
                     Ваш пароль: <tg-spoiler>{password}</tg-spoiler>"
                ))
            }
            Err(e) => {
                tracing::error!(chat_id, "registration binding failed: {e}");
                self.clear(chat_id);
                Reply::Text("❌ Не удалось завершить регистрацию. Попробуйте позже.".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attesta_core::Error;
    use std::sync::Mutex;

    struct MockDirectory {
        registered: Mutex<Vec<i64>>,
        // (role, last, first, patronymic) -> principal id
        principals: Vec<(Role, &'static str, &'static str, &'static str, i64)>,
        bound: Mutex<Vec<(Role, i64, String, i64)>>,
    }

    impl MockDirectory {
        fn with_students() -> Self {
            Self {
                registered: Mutex::new(Vec::new()),
                principals: vec![
                    (Role::Student, "иванов", "иван", "иванович", 42),
                    (Role::Curator, "петрова", "анна", "сергеевна", 7),
                ],
                bound: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Directory for MockDirectory {
        async fn chat_registered(&self, chat_id: i64) -> Result<bool> {
            Ok(self.registered.lock().unwrap().contains(&chat_id))
        }

        async fn find_by_full_name(
            &self,
            role: Role,
            last_name: &str,
            first_name: &str,
            patronymic: &str,
        ) -> Result<Option<i64>> {
            Ok(self
                .principals
                .iter()
                .find(|(r, l, f, p, _)| {
                    *r == role
                        && *l == last_name.to_lowercase()
                        && *f == first_name.to_lowercase()
                        && *p == patronymic.to_lowercase()
                })
                .map(|(_, _, _, _, id)| *id))
        }

        async fn bind_credentials(
            &self,
            role: Role,
            principal_id: i64,
            password: &str,
            chat_id: i64,
        ) -> Result<Option<String>> {
            if role == Role::Admin {
                return Err(Error::Forbidden);
            }
            self.registered.lock().unwrap().push(chat_id);
            self.bound
                .lock()
                .unwrap()
                .push((role, principal_id, password.to_string(), chat_id));
            Ok(Some("ivanov42".to_string()))
        }
    }

    fn flow() -> Registration<MockDirectory> {
        Registration::new(MockDirectory::with_students(), Duration::from_secs(1800))
    }

    #[tokio::test]
    async fn start_opens_role_choice() {
        let mut reg = flow();
        let reply = reg.start(100, "Иван").await;
        assert!(matches!(reply, Reply::RoleKeyboard(_)));
        assert_eq!(reg.state(100), Some(&Conversation::ChoosingRole));
    }

    #[tokio::test]
    async fn two_token_name_reprompts_and_stays() {
        let mut reg = flow();
        reg.start(100, "Иван").await;
        reg.on_callback(100, "role_student").await.unwrap();

        let reply = reg.on_message(100, "Иванов Иван").await.unwrap();
        assert!(matches!(reply, Reply::Text(t) if t.contains("ФИО")));
        assert_eq!(
            reg.state(100),
            Some(&Conversation::EnteringFullName { role: Role::Student })
        );
    }

    #[tokio::test]
    async fn unknown_name_aborts_and_clears_state() {
        let mut reg = flow();
        reg.start(100, "Иван").await;
        reg.on_callback(100, "role_student").await.unwrap();

        let reply = reg.on_message(100, "Сидоров Пётр Петрович").await.unwrap();
        assert!(matches!(reply, Reply::Text(t) if t.contains("не найден")));
        assert_eq!(reg.state(100), None);
    }

    #[tokio::test]
    async fn short_password_reprompts_and_stays() {
        let mut reg = flow();
        reg.start(100, "Иван").await;
        reg.on_callback(100, "role_student").await.unwrap();
        reg.on_message(100, "Иванов Иван Иванович").await.unwrap();

        let reply = reg.on_message(100, "abc").await.unwrap();
        assert!(matches!(reply, Reply::Text(t) if t.contains("4 символов")));
        assert_eq!(
            reg.state(100),
            Some(&Conversation::EnteringPassword {
                role: Role::Student,
                principal_id: 42
            })
        );
    }

    #[tokio::test]
    async fn full_flow_binds_and_clears() {
        let mut reg = flow();
        reg.start(100, "Иван").await;
        reg.on_callback(100, "role_student").await.unwrap();
        reg.on_message(100, "иванов иван иванович").await.unwrap();

        let reply = reg.on_message(100, "secret9").await.unwrap();
        assert!(matches!(reply, Reply::Text(t) if t.contains("успешно")));
        assert_eq!(reg.state(100), None);

        let bound = reg.directory.bound.lock().unwrap().clone();
        assert_eq!(bound, vec![(Role::Student, 42, "secret9".to_string(), 100)]);
    }

    #[tokio::test]
    async fn second_start_short_circuits_after_registration() {
        let mut reg = flow();
        reg.start(100, "Иван").await;
        reg.on_callback(100, "role_student").await.unwrap();
        reg.on_message(100, "Иванов Иван Иванович").await.unwrap();
        reg.on_message(100, "secret9").await.unwrap();

        let reply = reg.start(100, "Иван").await;
        assert!(matches!(reply, Reply::Text(t) if t.contains("уже зарегистрированы")));
        assert_eq!(reg.state(100), None);
    }

    #[tokio::test]
    async fn curator_path_uses_curator_table() {
        let mut reg = flow();
        reg.start(200, "Анна").await;
        reg.on_callback(200, "role_curator").await.unwrap();
        reg.on_message(200, "Петрова Анна Сергеевна").await.unwrap();
        reg.on_message(200, "pass1234").await.unwrap();

        let bound = reg.directory.bound.lock().unwrap().clone();
        assert_eq!(bound[0].0, Role::Curator);
        assert_eq!(bound[0].1, 7);
    }

    #[tokio::test]
    async fn text_without_active_flow_is_ignored() {
        let mut reg = flow();
        assert_eq!(reg.on_message(100, "привет").await, None);
    }

    #[tokio::test]
    async fn stale_conversations_are_evicted() {
        let mut reg = Registration::new(MockDirectory::with_students(), Duration::ZERO);
        reg.start(100, "Иван").await;
        assert!(reg.state(100).is_some());
        reg.evict_stale();
        assert_eq!(reg.state(100), None);

        let mut fresh = flow();
        fresh.start(100, "Иван").await;
        fresh.evict_stale();
        assert!(fresh.state(100).is_some());
    }
}
