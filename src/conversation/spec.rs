use std::collections::HashMap;

use crate::models::ProfileField;

/// Состояния диалога о профиле
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileState {
    ViewOptions,
    EditMenu,
    AwaitUsername,
    AwaitBio,
    AwaitLinkedin,
    AwaitGithub,
    AwaitWebsite,
}

impl ProfileState {
    pub const ALL: [ProfileState; 7] = [
        ProfileState::ViewOptions,
        ProfileState::EditMenu,
        ProfileState::AwaitUsername,
        ProfileState::AwaitBio,
        ProfileState::AwaitLinkedin,
        ProfileState::AwaitGithub,
        ProfileState::AwaitWebsite,
    ];

    pub fn awaiting(field: ProfileField) -> Self {
        match field {
            ProfileField::Bio => ProfileState::AwaitBio,
            ProfileField::Linkedin => ProfileState::AwaitLinkedin,
            ProfileField::Github => ProfileState::AwaitGithub,
            ProfileField::Website => ProfileState::AwaitWebsite,
        }
    }
}

/// Действия кнопок. Значение `callback_data` - `as_callback()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileAction {
    ViewMyProfile,
    EditMyProfile,
    ViewOtherProfile,
    EditBio,
    EditLinkedin,
    EditGithub,
    EditWebsite,
    Start,
    FullCancel,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown profile callback: {0:?}")]
pub struct UnknownAction(pub String);

impl ProfileAction {
    pub const ALL: [ProfileAction; 9] = [
        ProfileAction::ViewMyProfile,
        ProfileAction::EditMyProfile,
        ProfileAction::ViewOtherProfile,
        ProfileAction::EditBio,
        ProfileAction::EditLinkedin,
        ProfileAction::EditGithub,
        ProfileAction::EditWebsite,
        ProfileAction::Start,
        ProfileAction::FullCancel,
    ];

    pub const PREFIX: &'static str = "profile_";

    pub fn as_callback(self) -> &'static str {
        match self {
            ProfileAction::ViewMyProfile => "profile_view_my",
            ProfileAction::EditMyProfile => "profile_edit_my",
            ProfileAction::ViewOtherProfile => "profile_view_other",
            ProfileAction::EditBio => "profile_edit_bio",
            ProfileAction::EditLinkedin => "profile_edit_linkedin",
            ProfileAction::EditGithub => "profile_edit_github",
            ProfileAction::EditWebsite => "profile_edit_website",
            ProfileAction::Start => "profile_start",
            ProfileAction::FullCancel => "profile_full_cancel",
        }
    }

    pub fn parse(data: &str) -> Result<Self, UnknownAction> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_callback() == data)
            .ok_or_else(|| UnknownAction(data.to_string()))
    }
}

/// Класс входных данных, который состояние может принять
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputClass {
    Text,
    Action(ProfileAction),
}

/// Обработчик перехода
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    ShowMainMenu,
    ShowOwnProfile,
    ShowEditMenu,
    AskUsername,
    SearchProfile,
    AskField(ProfileField),
    SaveField(ProfileField),
    Cancel,
}

/// Строка таблицы переходов. `next == None` - диалог завершается.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub handler: Handler,
    pub next: Option<ProfileState>,
}

/// Неизменяемая таблица переходов, строится один раз при старте
#[derive(Debug, Clone)]
pub struct ConversationSpec {
    routes: HashMap<ProfileState, HashMap<InputClass, Route>>,
}

impl ConversationSpec {
    pub fn profile() -> Self {
        use ProfileAction as A;
        use ProfileState as S;

        let to = |handler, next| Route { handler, next: Some(next) };
        let cancel = Route { handler: Handler::Cancel, next: None };

        let mut routes: HashMap<ProfileState, HashMap<InputClass, Route>> = HashMap::new();

        routes.insert(
            S::ViewOptions,
            HashMap::from([
                (InputClass::Action(A::ViewMyProfile), to(Handler::ShowOwnProfile, S::ViewOptions)),
                (InputClass::Action(A::EditMyProfile), to(Handler::ShowEditMenu, S::EditMenu)),
                (InputClass::Action(A::ViewOtherProfile), to(Handler::AskUsername, S::AwaitUsername)),
                (InputClass::Action(A::Start), to(Handler::ShowMainMenu, S::ViewOptions)),
            ]),
        );

        let mut edit_menu = HashMap::from([
            (InputClass::Action(A::EditMyProfile), to(Handler::ShowEditMenu, S::EditMenu)),
            (InputClass::Action(A::Start), to(Handler::ShowMainMenu, S::ViewOptions)),
        ]);
        for (action, field) in [
            (A::EditBio, ProfileField::Bio),
            (A::EditLinkedin, ProfileField::Linkedin),
            (A::EditGithub, ProfileField::Github),
            (A::EditWebsite, ProfileField::Website),
        ] {
            edit_menu.insert(
                InputClass::Action(action),
                to(Handler::AskField(field), S::awaiting(field)),
            );
        }
        routes.insert(S::EditMenu, edit_menu);

        routes.insert(
            S::AwaitUsername,
            HashMap::from([
                (InputClass::Text, to(Handler::SearchProfile, S::ViewOptions)),
                (InputClass::Action(A::Start), to(Handler::ShowMainMenu, S::ViewOptions)),
            ]),
        );

        for field in ProfileField::ALL {
            routes.insert(
                S::awaiting(field),
                HashMap::from([
                    (InputClass::Text, to(Handler::SaveField(field), S::EditMenu)),
                    (InputClass::Action(A::EditMyProfile), to(Handler::ShowEditMenu, S::EditMenu)),
                    (InputClass::Action(A::Start), to(Handler::ShowMainMenu, S::ViewOptions)),
                ]),
            );
        }

        // Выход доступен из любого состояния
        for state_routes in routes.values_mut() {
            state_routes.insert(InputClass::Action(A::FullCancel), cancel);
        }

        Self { routes }
    }

    pub fn route(&self, state: ProfileState, input: InputClass) -> Option<Route> {
        self.routes.get(&state)?.get(&input).copied()
    }

    pub fn accepts(&self, state: ProfileState, input: InputClass) -> bool {
        self.route(state, input).is_some()
    }
}
