use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::html;

use super::spec::ProfileAction;
use crate::models::{Profile, ProfileField, User};
use crate::services::OutgoingMessage;

fn button(text: &str, action: ProfileAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, action.as_callback())
}

fn cancel_button() -> InlineKeyboardButton {
    button("❌ Отмена", ProfileAction::FullCancel)
}

/// Главное меню профиля
pub fn main_menu() -> OutgoingMessage {
    OutgoingMessage::html("<b>Профиль</b>\n\nВыбери действие:").keyboard(InlineKeyboardMarkup::new(
        vec![
            vec![button("👤 Мой профиль", ProfileAction::ViewMyProfile)],
            vec![button("✏️ Редактировать мой профиль", ProfileAction::EditMyProfile)],
            vec![button("🔎 Найти профиль участника", ProfileAction::ViewOtherProfile)],
            vec![cancel_button()],
        ],
    ))
}

/// Меню редактирования; `notice` выводится над ним (например, «сохранено»)
pub fn edit_menu(notice: Option<&str>) -> OutgoingMessage {
    let mut text = String::new();
    if let Some(notice) = notice {
        text.push_str(notice);
        text.push_str("\n\n");
    }
    text.push_str("<b>Редактирование профиля</b>\n\nВыбери, что хочешь изменить:");

    OutgoingMessage::html(text).keyboard(InlineKeyboardMarkup::new(vec![
        vec![
            button("📝 Биография", ProfileAction::EditBio),
            button("💼 LinkedIn", ProfileAction::EditLinkedin),
        ],
        vec![
            button("🐙 GitHub", ProfileAction::EditGithub),
            button("🌐 Ресурс", ProfileAction::EditWebsite),
        ],
        vec![button("⬅️ Назад", ProfileAction::Start), cancel_button()],
    ]))
}

pub fn field_title(field: ProfileField) -> &'static str {
    match field {
        ProfileField::Bio => "биографию (до 2000 символов)",
        ProfileField::Linkedin => "ссылку на LinkedIn",
        ProfileField::Github => "ссылку на GitHub",
        ProfileField::Website => "ссылку на твой ресурс",
    }
}

pub fn field_saved(field: ProfileField) -> &'static str {
    match field {
        ProfileField::Bio => "✅ Биография сохранена!",
        ProfileField::Linkedin => "✅ Ссылка на LinkedIn сохранена!",
        ProfileField::Github => "✅ Ссылка на GitHub сохранена!",
        ProfileField::Website => "✅ Ссылка сохранена!",
    }
}

/// Запрос нового значения поля. `error` - причина повторного запроса.
pub fn ask_field(field: ProfileField, current: Option<&str>, error: Option<&str>) -> OutgoingMessage {
    let current = current
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or("отсутствует");

    let mut text = String::from("<b>Редактирование профиля</b>");
    if let Some(error) = error {
        text.push_str(&format!("\n\n⚠️ {}", html::escape(error)));
    }
    text.push_str(&format!(
        "\n\nТекущее значение: <code>{}</code>\n\nВведи новую {}:",
        html::escape(current),
        field_title(field)
    ));

    OutgoingMessage::html(text).keyboard(InlineKeyboardMarkup::new(vec![vec![
        button("⬅️ Назад", ProfileAction::EditMyProfile),
        cancel_button(),
    ]]))
}

pub fn ask_username(error: Option<&str>) -> OutgoingMessage {
    let mut text = String::from("<b>Поиск профиля</b>\n\n");
    if let Some(error) = error {
        text.push_str(&format!("⚠️ {}\n\n", html::escape(error)));
    }
    text.push_str("Введи имя пользователя (с @ или без):");

    OutgoingMessage::html(text).keyboard(InlineKeyboardMarkup::new(vec![vec![
        button("⬅️ Назад", ProfileAction::Start),
        cancel_button(),
    ]]))
}

pub fn username_not_found(username: &str) -> OutgoingMessage {
    OutgoingMessage::html(format!(
        "<b>Поиск профиля</b>\n\nПользователь <b>{}</b> не найден.\n\n\
         Нажми на кнопку «🔎 Ещё раз» для повторного поиска.",
        html::escape(username)
    ))
    .keyboard(InlineKeyboardMarkup::new(vec![
        vec![button("🔎 Ещё раз", ProfileAction::ViewOtherProfile)],
        vec![button("⬅️ Назад", ProfileAction::Start), cancel_button()],
    ]))
}

/// Карточка профиля. Для своего профиля добавляется кнопка редактирования.
pub fn profile_view(user: &User, profile: Option<&Profile>, own: bool) -> OutgoingMessage {
    let text = format_profile(user, profile, own);

    let mut rows = Vec::new();
    if own {
        rows.push(vec![button("✏️ Редактировать", ProfileAction::EditMyProfile)]);
    }
    rows.push(vec![button("⬅️ Назад", ProfileAction::Start), cancel_button()]);

    OutgoingMessage::html(text).keyboard(InlineKeyboardMarkup::new(rows))
}

pub fn format_profile(user: &User, profile: Option<&Profile>, own: bool) -> String {
    let Some(profile) = profile else {
        return if own {
            "Твой профиль не найден.\n\nСоздай его через кнопку «Редактировать».".to_string()
        } else {
            format!(
                "У пользователя <b>{}</b> ещё нет профиля.",
                html::escape(&user.full_name())
            )
        };
    };

    let mut text = format!(
        "🖐 <b><a href=\"tg://user?id={}\">{}</a></b>",
        user.tg_id,
        html::escape(&user.full_name())
    );
    if !user.tg_username.is_empty() {
        text.push_str(&format!(" (@{})", html::escape(&user.tg_username)));
    }
    text.push('\n');

    if !profile.bio.trim().is_empty() {
        text.push_str(&format!(
            "\n<blockquote>О себе</blockquote>\n{}\n",
            html::escape(&profile.bio)
        ));
    }

    let links: Vec<String> = [
        ("LinkedIn", &profile.linkedin),
        ("GitHub", &profile.github),
        ("Ресурс", &profile.website),
    ]
    .into_iter()
    .filter(|(_, url)| !url.trim().is_empty())
    .map(|(title, url)| format!("<a href=\"{}\">{}</a>", html::escape(url), title))
    .collect();
    if !links.is_empty() {
        text.push_str(&format!("\n🔗 {}\n", links.join(" | ")));
    }

    text
}

pub const CANCELLED_TEXT: &str = "Диалог о профилях завершен.";
pub const LOAD_ERROR_TEXT: &str = "Произошла ошибка при получении информации о профиле.";
pub const SAVE_ERROR_TEXT: &str = "Произошла ошибка при сохранении профиля.";
