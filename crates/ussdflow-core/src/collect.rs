//! Input collection protocol.
//!
//! A session on an input screen with `N` inputs has a cursor in `[0, N]`.
//! Each accepted message stores one value and advances the cursor by one;
//! `cursor == N` means every input is collected. A rejected selection writes
//! nothing, so the same prompt can simply be shown again.

use ussdflow_types::error::{ContractViolation, FlowError, RepositoryError};
use ussdflow_types::input::InputDescriptor;
use ussdflow_types::response::Response;
use ussdflow_types::session::FIELD_POSITION;

use crate::screen::InputScreen;
use crate::screen::prompt::render_prompt;
use crate::session::Session;
use crate::storage::HashWrite;

/// Plaintext values of one input screen, in the screen's declared order.
///
/// Rebuilt from the store on every use; never the source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedValues {
    entries: Vec<(String, String)>,
}

impl CollectedValues {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, name: String, value: String) {
        self.entries.push((name, value));
    }
}

impl IntoIterator for CollectedValues {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Result of [`collect_and_respond`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collected {
    /// More inputs remain; this is the prompt for the next one.
    Prompt(Response),
    /// Every input is stored. The caller runs the completion behavior.
    Complete,
}

/// Turn the user's message into the value to store for `input`.
///
/// For option inputs the message must be a 1-based ordinal; anything else
/// (non-numeric or out of range) is `InvalidSelection`.
pub fn resolve_value(input: &InputDescriptor, message: &str) -> Result<String, FlowError> {
    if input.options.is_none() {
        return Ok(message.to_string());
    }
    match input.option_for(message) {
        Some(option) => Ok(option.value.clone()),
        None => {
            tracing::debug!(input = %input.name, "rejected option selection");
            Err(FlowError::InvalidSelection)
        }
    }
}

/// Store `message` as the value of the input under the cursor and advance it.
///
/// The value and the new cursor go to the store in one batch. Returns the
/// new cursor.
pub async fn receive_value(
    session: &Session,
    screen: &InputScreen,
    message: &str,
) -> Result<usize, FlowError> {
    let cursor = session.cursor().await?;
    let input = screen
        .inputs
        .get(cursor)
        .ok_or(ContractViolation::CursorOutOfBounds {
            cursor,
            len: screen.inputs.len(),
        })?;

    let value = resolve_value(input, message)?;
    let stored = if input.encrypt {
        session.encrypt(&value).await?
    } else {
        value
    };

    let next = cursor + 1;
    let keys = session.keys();
    session
        .store()
        .hset_batch(&[
            HashWrite::new(&keys.input_data, &input.name, stored),
            HashWrite::new(&keys.meta, FIELD_POSITION, next.to_string()),
        ])
        .await?;

    tracing::debug!(
        session_id = %session.id(),
        input = %input.name,
        cursor = next,
        "input value stored"
    );
    Ok(next)
}

/// [`receive_value`], then the prompt for the next input if any remain.
pub async fn collect_and_respond(
    session: &Session,
    screen: &InputScreen,
    message: &str,
) -> Result<Collected, FlowError> {
    let next = receive_value(session, screen, message).await?;
    if next < screen.inputs.len() {
        Ok(Collected::Prompt(Response::con(render_prompt(screen, next)?)))
    } else {
        Ok(Collected::Complete)
    }
}

/// Read every input of `screen` back from the store, decrypting as needed.
///
/// A missing value means the store lost part of the session and is reported
/// as a store `NotFound`.
pub async fn materialize(
    session: &Session,
    screen: &InputScreen,
) -> Result<CollectedValues, FlowError> {
    let mut values = CollectedValues::default();
    for input in &screen.inputs {
        let stored = session.stored_value(&input.name).await?.ok_or_else(|| {
            RepositoryError::NotFound(format!("{} {}", session.keys().input_data, input.name))
        })?;
        let value = if input.encrypt {
            session.decrypt(&stored).await?
        } else {
            stored
        };
        values.push(input.name.clone(), value);
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screen::{BehaviorFuture, Screen, ScreenContext, Transition};
    use crate::testing::{MockStore, session};
    use ussdflow_types::input::InputOption;

    const INPUT_KEY: &str = "ussd:abc:InputData";
    const META_KEY: &str = "ussd:abc:Session";

    fn done(_ctx: ScreenContext, _values: CollectedValues) -> BehaviorFuture {
        Box::pin(async { Ok(Transition::Reply(Response::end("done"))) })
    }

    fn input_screen(title: &str, inputs: Vec<InputDescriptor>) -> InputScreen {
        match Screen::input(title, inputs, done).unwrap() {
            Screen::Input(screen) => screen,
            _ => unreachable!(),
        }
    }

    fn profile_screen() -> InputScreen {
        input_screen(
            "Profile",
            vec![
                InputDescriptor::new("name", "name"),
                InputDescriptor::new("pin", "PIN").encrypted(),
            ],
        )
    }

    fn fruit_screen() -> InputScreen {
        input_screen(
            "Fruit",
            vec![
                InputDescriptor::new("fruit", "fruit")
                    .with_options([
                        InputOption::new("A", "Apple"),
                        InputOption::new("B", "Banana"),
                    ])
                    .unwrap(),
            ],
        )
    }

    #[tokio::test]
    async fn test_name_then_encrypted_pin() {
        let store = MockStore::default();
        let session = session(&store, "abc");
        let screen = profile_screen();

        assert_eq!(receive_value(&session, &screen, "Alice").await.unwrap(), 1);
        assert_eq!(store.get(INPUT_KEY, "name").as_deref(), Some("Alice"));
        assert_eq!(store.get(META_KEY, "Position").as_deref(), Some("1"));

        assert_eq!(receive_value(&session, &screen, "1234").await.unwrap(), 2);
        let stored_pin = store.get(INPUT_KEY, "pin").unwrap();
        assert_ne!(stored_pin, "1234");
        assert_eq!(stored_pin, session.encrypt("1234").await.unwrap());
        assert_eq!(session.cursor().await.unwrap(), 2);

        let values = materialize(&session, &screen).await.unwrap();
        assert_eq!(
            values.iter().collect::<Vec<_>>(),
            vec![("name", "Alice"), ("pin", "1234")]
        );
    }

    #[tokio::test]
    async fn test_n_values_reach_terminal_cursor() {
        let store = MockStore::default();
        let session = session(&store, "abc");
        let screen = input_screen(
            "Survey",
            vec![
                InputDescriptor::new("a", "A"),
                InputDescriptor::new("b", "B").encrypted(),
                InputDescriptor::new("c", "C"),
            ],
        );

        for answer in ["one", "two", "three"] {
            receive_value(&session, &screen, answer).await.unwrap();
        }

        assert_eq!(session.cursor().await.unwrap(), screen.inputs.len());
        let values = materialize(&session, &screen).await.unwrap();
        for input in &screen.inputs {
            assert!(values.contains(&input.name));
        }
        assert_eq!(values.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_option_selection_stores_value() {
        let store = MockStore::default();
        let session = session(&store, "abc");

        receive_value(&session, &fruit_screen(), "2").await.unwrap();
        assert_eq!(store.get(INPUT_KEY, "fruit").as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_invalid_selection_changes_nothing() {
        let store = MockStore::default();
        let session = session(&store, "abc");
        let screen = fruit_screen();

        for bad in ["5", "x", "0", ""] {
            let err = receive_value(&session, &screen, bad).await.unwrap_err();
            assert!(matches!(err, FlowError::InvalidSelection));
        }
        assert_eq!(store.write_count(), 0);
        assert!(store.get(INPUT_KEY, "fruit").is_none());
        assert_eq!(session.cursor().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_encrypted_option_decrypts_to_resolved_value() {
        let store = MockStore::default();
        let session = session(&store, "abc");
        let screen = input_screen(
            "Plan",
            vec![
                InputDescriptor::new("plan", "plan")
                    .with_options([
                        InputOption::new("gold", "Gold"),
                        InputOption::new("silver", "Silver"),
                    ])
                    .unwrap()
                    .encrypted(),
            ],
        );

        receive_value(&session, &screen, "1").await.unwrap();
        assert_ne!(store.get(INPUT_KEY, "plan").as_deref(), Some("gold"));
        let values = materialize(&session, &screen).await.unwrap();
        assert_eq!(values.get("plan"), Some("gold"));
    }

    #[tokio::test]
    async fn test_reanswer_overwrites_previous_value() {
        let store = MockStore::default();
        let session = session(&store, "abc");
        let screen = profile_screen();

        receive_value(&session, &screen, "Alice").await.unwrap();
        session.set_cursor(0).await.unwrap();
        receive_value(&session, &screen, "Bob").await.unwrap();
        receive_value(&session, &screen, "9999").await.unwrap();

        let values = materialize(&session, &screen).await.unwrap();
        assert_eq!(values.get("name"), Some("Bob"));
        assert_eq!(values.len(), 2);
    }

    #[tokio::test]
    async fn test_receive_past_end_is_contract_violation() {
        let store = MockStore::default();
        let session = session(&store, "abc");
        session.set_cursor(1).await.unwrap();

        let err = receive_value(&session, &fruit_screen(), "1").await.unwrap_err();
        assert!(matches!(
            err,
            FlowError::Contract(ContractViolation::CursorOutOfBounds { cursor: 1, len: 1 })
        ));
    }

    #[tokio::test]
    async fn test_collect_and_respond_prompts_then_completes() {
        let store = MockStore::default();
        let session = session(&store, "abc");
        let screen = profile_screen();

        let first = collect_and_respond(&session, &screen, "Alice").await.unwrap();
        assert_eq!(first, Collected::Prompt(Response::con("Profile\nEnter PIN:")));

        let second = collect_and_respond(&session, &screen, "1234").await.unwrap();
        assert_eq!(second, Collected::Complete);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = MockStore::default();
        let session = session(&store, "abc");
        store.fail_writes(true);

        let err = receive_value(&session, &profile_screen(), "Alice")
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Store(RepositoryError::Query(_))));
    }

    #[tokio::test]
    async fn test_materialize_missing_value_is_not_found() {
        let store = MockStore::default();
        let session = session(&store, "abc");

        let err = materialize(&session, &profile_screen()).await.unwrap_err();
        assert!(matches!(err, FlowError::Store(RepositoryError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_materialize_reflects_store_not_cache() {
        let store = MockStore::default();
        let session = session(&store, "abc");
        let screen = fruit_screen();

        receive_value(&session, &screen, "1").await.unwrap();
        assert_eq!(materialize(&session, &screen).await.unwrap().get("fruit"), Some("A"));

        store.put(INPUT_KEY, "fruit", "B");
        assert_eq!(materialize(&session, &screen).await.unwrap().get("fruit"), Some("B"));
    }

    #[test]
    fn test_resolve_value_free_text_is_verbatim() {
        let input = InputDescriptor::new("name", "name");
        assert_eq!(resolve_value(&input, " Alice ").unwrap(), " Alice ");
    }
}
