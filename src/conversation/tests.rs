use std::sync::Arc;

use teloxide::types::{ChatId, MessageId, UserId};

use super::*;
use crate::services::PermissionsService;
use crate::testing::{
    incoming, FixedGate, InMemoryProfiles, InMemoryUsers, RecordingSender, SentItem,
};

struct Harness {
    engine: ProfileConversation,
    sender: Arc<RecordingSender>,
    users: Arc<InMemoryUsers>,
    profiles: Arc<InMemoryProfiles>,
}

fn harness_with(gate: FixedGate) -> Harness {
    let sender = Arc::new(RecordingSender::default());
    let users = Arc::new(InMemoryUsers::default());
    let profiles = Arc::new(InMemoryProfiles::default());
    let permissions = PermissionsService::new(Arc::new(gate), sender.clone());
    let engine = ProfileConversation::new(
        SessionStore::new(),
        sender.clone(),
        permissions,
        users.clone(),
        profiles.clone(),
    );
    Harness { engine, sender, users, profiles }
}

fn harness() -> Harness {
    harness_with(FixedGate::member())
}

impl Harness {
    async fn send(&self, user: u64, input: Input) -> Outcome {
        self.engine
            .handle(&incoming(user), input)
            .await
            .expect("handled")
    }

    async fn state(&self, user: u64) -> Option<ProfileState> {
        self.engine.sessions().state(UserId(user)).await
    }

    /// Проводит пользователя до нужного состояния
    async fn reach(&self, user: u64, state: ProfileState) {
        self.send(user, Input::Command).await;
        let path: &[ProfileAction] = match state {
            ProfileState::ViewOptions => &[],
            ProfileState::EditMenu => &[ProfileAction::EditMyProfile],
            ProfileState::AwaitUsername => &[ProfileAction::ViewOtherProfile],
            ProfileState::AwaitBio => &[ProfileAction::EditMyProfile, ProfileAction::EditBio],
            ProfileState::AwaitLinkedin => &[ProfileAction::EditMyProfile, ProfileAction::EditLinkedin],
            ProfileState::AwaitGithub => &[ProfileAction::EditMyProfile, ProfileAction::EditGithub],
            ProfileState::AwaitWebsite => &[ProfileAction::EditMyProfile, ProfileAction::EditWebsite],
        };
        for action in path {
            self.send(user, Input::Action(*action)).await;
        }
        assert_eq!(self.state(user).await, Some(state));
    }
}

#[tokio::test]
async fn command_in_group_chat_is_denied_without_session() {
    let h = harness();
    let mut group = incoming(1);
    group.is_private = false;
    group.chat_id = ChatId(-100500);

    let outcome = h.engine.handle(&group, Input::Command).await.unwrap();

    assert_eq!(outcome, Outcome::Denied);
    assert_eq!(h.state(1).await, None);
    assert_eq!(h.sender.messages().len(), 1);
    assert!(h.sender.messages()[0].contains("личной беседе"));
}

#[tokio::test]
async fn group_chat_messages_do_not_reach_private_dialog() {
    let h = harness();
    h.reach(1, ProfileState::AwaitBio).await;
    let prompt = h.engine.sessions().previous_message(UserId(1)).await;
    let sent_before = h.sender.sent().len();

    let mut group = incoming(1);
    group.is_private = false;
    group.chat_id = ChatId(-100500);
    group.message_id = Some(MessageId(777));

    let inputs = [
        Input::Text("chatting in the club group".to_string()),
        Input::Action(ProfileAction::EditGithub),
        Input::Action(ProfileAction::FullCancel),
        Input::Cancel,
    ];
    for input in inputs {
        assert_eq!(h.engine.handle(&group, input).await.unwrap(), Outcome::Ignored);
    }

    assert!(h.profiles.all().is_empty());
    assert_eq!(h.sender.sent().len(), sent_before);
    assert_eq!(h.state(1).await, Some(ProfileState::AwaitBio));
    assert_eq!(h.engine.sessions().previous_message(UserId(1)).await, prompt);

    // в личном чате диалог продолжается как обычно
    assert_eq!(
        h.send(1, Input::Text("Backend developer".to_string())).await,
        Outcome::Moved(ProfileState::EditMenu)
    );
    assert_eq!(h.profiles.all()[0].bio, "Backend developer");
}

#[tokio::test]
async fn command_from_non_member_is_denied_without_session() {
    let h = harness_with(FixedGate::stranger());

    assert_eq!(h.send(1, Input::Command).await, Outcome::Denied);
    assert_eq!(h.state(1).await, None);
}

#[tokio::test]
async fn command_opens_main_menu() {
    let h = harness();

    assert_eq!(
        h.send(1, Input::Command).await,
        Outcome::Moved(ProfileState::ViewOptions)
    );
    let menu_id = h.sender.last_message_id().unwrap();
    assert_eq!(
        h.engine.sessions().previous_message(UserId(1)).await,
        Some(PreviousMessage { chat_id: ChatId(1), message_id: menu_id })
    );
}

#[tokio::test]
async fn each_new_screen_deletes_the_previous_one() {
    let h = harness();
    h.send(1, Input::Command).await;
    let menu_id = h.sender.last_message_id().unwrap();

    h.send(1, Input::Action(ProfileAction::EditMyProfile)).await;
    let edit_id = h.sender.last_message_id().unwrap();

    assert!(h.sender.sent().contains(&SentItem::Deleted {
        chat_id: ChatId(1),
        message_id: menu_id,
    }));
    assert_eq!(
        h.engine.sessions().previous_message(UserId(1)).await,
        Some(PreviousMessage { chat_id: ChatId(1), message_id: edit_id })
    );
}

#[tokio::test]
async fn bio_of_2001_chars_is_rejected_and_2000_accepted() {
    let h = harness();
    h.reach(1, ProfileState::AwaitBio).await;

    let too_long = "a".repeat(2001);
    assert_eq!(
        h.send(1, Input::Text(too_long)).await,
        Outcome::Stayed(ProfileState::AwaitBio)
    );
    assert_eq!(h.state(1).await, Some(ProfileState::AwaitBio));
    assert!(h.profiles.all().is_empty());
    assert!(h.sender.messages().last().unwrap().contains("слишком длинная"));

    let exact = "a".repeat(2000);
    assert_eq!(
        h.send(1, Input::Text(exact.clone())).await,
        Outcome::Moved(ProfileState::EditMenu)
    );
    assert_eq!(h.state(1).await, Some(ProfileState::EditMenu));

    let profiles = h.profiles.all();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].bio, exact);
    assert!(profiles[0].github.is_empty());
}

#[tokio::test]
async fn saving_second_field_updates_only_that_field() {
    let h = harness();
    h.reach(1, ProfileState::AwaitBio).await;
    h.send(1, Input::Text("Rustacean".into())).await;

    h.send(1, Input::Action(ProfileAction::EditGithub)).await;
    assert_eq!(h.state(1).await, Some(ProfileState::AwaitGithub));
    assert_eq!(
        h.engine.sessions().get(UserId(1), "profile_field").await.as_deref(),
        Some("github")
    );
    h.send(1, Input::Text("https://github.com/user1".into())).await;

    let profiles = h.profiles.all();
    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].bio, "Rustacean");
    assert_eq!(profiles[0].github, "https://github.com/user1");
    assert_eq!(h.users.all().len(), 1);
    assert_eq!(h.engine.sessions().get(UserId(1), "profile_field").await, None);
}

#[tokio::test]
async fn invalid_links_keep_the_user_in_place() {
    let h = harness();

    h.reach(1, ProfileState::AwaitLinkedin).await;
    assert_eq!(
        h.send(1, Input::Text("https://example.com/me".into())).await,
        Outcome::Stayed(ProfileState::AwaitLinkedin)
    );

    h.send(1, Input::Action(ProfileAction::EditMyProfile)).await;
    h.send(1, Input::Action(ProfileAction::EditWebsite)).await;
    assert_eq!(
        h.send(1, Input::Text("example.com".into())).await,
        Outcome::Stayed(ProfileState::AwaitWebsite)
    );
    assert_eq!(
        h.send(1, Input::Text("https://example.com".into())).await,
        Outcome::Moved(ProfileState::EditMenu)
    );
}

#[tokio::test]
async fn user_input_is_removed_from_chat() {
    let h = harness();
    h.reach(1, ProfileState::AwaitBio).await;
    h.send(1, Input::Text("hello".into())).await;

    assert!(h.sender.sent().contains(&SentItem::Deleted {
        chat_id: ChatId(1),
        message_id: MessageId(100_000),
    }));
}

#[tokio::test]
async fn cancel_from_every_state_clears_session_and_keyboard() {
    for state in ProfileState::ALL {
        for input in [Input::Cancel, Input::Action(ProfileAction::FullCancel)] {
            let h = harness();
            h.reach(1, state).await;
            let last_prompt = h.engine.sessions().previous_message(UserId(1)).await.unwrap();

            assert_eq!(h.send(1, input.clone()).await, Outcome::Ended, "{state:?} {input:?}");
            assert!(!h.engine.sessions().contains(UserId(1)).await);
            assert_eq!(h.engine.sessions().get(UserId(1), "profile_field").await, None);
            assert!(h.sender.sent().contains(&SentItem::KeyboardRemoved {
                chat_id: last_prompt.chat_id,
                message_id: last_prompt.message_id,
            }));
            assert_eq!(h.sender.messages().last().unwrap(), screens::CANCELLED_TEXT);
        }
    }
}

#[tokio::test]
async fn cancel_after_validation_failure_still_cleans_up() {
    let h = harness();
    h.reach(1, ProfileState::AwaitGithub).await;
    h.send(1, Input::Text("not a link".into())).await;

    assert_eq!(h.send(1, Input::Cancel).await, Outcome::Ended);
    assert_eq!(h.state(1).await, None);
}

#[tokio::test]
async fn inputs_without_session_or_route_are_ignored() {
    let h = harness();
    assert_eq!(h.send(1, Input::Text("hi".into())).await, Outcome::Ignored);
    assert_eq!(h.send(1, Input::Cancel).await, Outcome::Ignored);

    h.send(1, Input::Command).await;
    let sent_before = h.sender.sent().len();
    assert_eq!(h.send(1, Input::Text("hi".into())).await, Outcome::Ignored);
    assert_eq!(
        h.send(1, Input::Action(ProfileAction::EditBio)).await,
        Outcome::Ignored
    );
    assert_eq!(h.state(1).await, Some(ProfileState::ViewOptions));
    assert_eq!(h.sender.sent().len(), sent_before);
}

#[tokio::test]
async fn send_failure_leaves_session_unchanged() {
    let h = harness();
    h.reach(1, ProfileState::EditMenu).await;
    let prompt = h.engine.sessions().previous_message(UserId(1)).await;

    h.sender.set_failing(true);
    let result = h
        .engine
        .handle(&incoming(1), Input::Action(ProfileAction::EditBio))
        .await;

    assert!(matches!(result, Err(ConversationError::Send(_))));
    assert_eq!(h.state(1).await, Some(ProfileState::EditMenu));
    assert_eq!(h.engine.sessions().previous_message(UserId(1)).await, prompt);
    assert_eq!(h.engine.sessions().get(UserId(1), "profile_field").await, None);
}

#[tokio::test]
async fn repository_failure_keeps_state_and_reports() {
    let h = harness();
    h.reach(1, ProfileState::AwaitBio).await;

    h.profiles.set_failing(true);
    let result = h.engine.handle(&incoming(1), Input::Text("bio".into())).await;

    assert!(matches!(result, Err(ConversationError::Repository(_))));
    assert_eq!(h.state(1).await, Some(ProfileState::AwaitBio));
    assert_eq!(h.sender.messages().last().unwrap(), screens::SAVE_ERROR_TEXT);
}

#[tokio::test]
async fn search_finds_profile_by_username() {
    let h = harness();
    h.reach(2, ProfileState::AwaitBio).await;
    h.send(2, Input::Text("I write parsers".into())).await;

    h.reach(1, ProfileState::AwaitUsername).await;
    assert_eq!(
        h.send(1, Input::Text("@USER2".into())).await,
        Outcome::Moved(ProfileState::ViewOptions)
    );
    assert!(h.sender.messages().last().unwrap().contains("I write parsers"));

    h.send(1, Input::Action(ProfileAction::ViewOtherProfile)).await;
    h.send(1, Input::Text("nobody".into())).await;
    assert!(h.sender.messages().last().unwrap().contains("не найден"));
    assert_eq!(h.state(1).await, Some(ProfileState::ViewOptions));

    h.send(1, Input::Action(ProfileAction::ViewOtherProfile)).await;
    assert_eq!(
        h.send(1, Input::Text("@".into())).await,
        Outcome::Stayed(ProfileState::AwaitUsername)
    );
}

#[tokio::test]
async fn own_profile_is_created_on_first_view() {
    let h = harness();
    h.send(1, Input::Command).await;

    assert_eq!(
        h.send(1, Input::Action(ProfileAction::ViewMyProfile)).await,
        Outcome::Moved(ProfileState::ViewOptions)
    );
    assert_eq!(h.users.all().len(), 1);
    assert!(h.sender.messages().last().unwrap().contains("профиль не найден"));
}

#[tokio::test]
async fn concurrent_dialogs_do_not_touch_each_other() {
    let h = Arc::new(harness());
    let mut handles = Vec::new();
    for user in 1..=20u64 {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            h.reach(user, ProfileState::AwaitBio).await;
            h.send(user, Input::Text(format!("bio of {user}"))).await;
            if user % 2 == 0 {
                h.send(user, Input::Cancel).await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for user in 1..=20u64 {
        let expected = (user % 2 == 1).then_some(ProfileState::EditMenu);
        assert_eq!(h.state(user).await, expected);
        if let Some(prompt) = h.engine.sessions().previous_message(UserId(user)).await {
            assert_eq!(prompt.chat_id, ChatId(user as i64));
        }
    }
    let users = h.users.all();
    for profile in h.profiles.all() {
        let owner = users.iter().find(|u| u.id == profile.user_id).unwrap();
        assert_eq!(profile.bio, format!("bio of {}", owner.tg_id));
    }
}
