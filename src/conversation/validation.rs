use crate::models::ProfileField;

pub const MAX_BIO_CHARS: usize = 2000;

/// Проверяет значение поля. `Err` содержит текст для повторного запроса.
pub fn validate_field(field: ProfileField, value: &str) -> Result<String, &'static str> {
    let value = value.trim();
    if value.is_empty() {
        return Err("Значение не может быть пустым. Пришли его снова:");
    }

    match field {
        ProfileField::Bio if value.chars().count() > MAX_BIO_CHARS => {
            Err("Биография слишком длинная. Пожалуйста, сократи до 2000 символов и пришли снова:")
        }
        ProfileField::Linkedin if !value.to_lowercase().contains("linkedin") => {
            Err("Пожалуйста, введи корректную ссылку на LinkedIn:")
        }
        ProfileField::Github if !value.to_lowercase().contains("github") => {
            Err("Пожалуйста, введи корректную ссылку на GitHub:")
        }
        ProfileField::Website if !value.starts_with("http") => {
            Err("Пожалуйста, введи корректную ссылку (начинается с http):")
        }
        _ => Ok(value.to_string()),
    }
}

/// Имя пользователя для поиска: без `@` и пробелов
pub fn normalize_username(input: &str) -> Option<String> {
    let username = input.trim().trim_start_matches('@').trim();
    (!username.is_empty()).then(|| username.to_string())
}
