//! Reply formatters for bot commands.
//!
//! Every reply the bot sends is produced here. Replies are plain text with
//! lightweight markup: `*text*` for emphasis and `:name:` emoji codes. The
//! formatters are pure: randomness is decided by the callers.

/// Replies used once a user keeps sending commands the bot does not know.
///
/// One of them is picked uniformly after more than three misses in a row.
pub const ESCALATION_MESSAGES: [&str; 6] = [
    "_Ты тупой?_",
    "_Ну вот для кого я выше писал, как мной пользоваться?_",
    "_Забей короче, ничего не скажу._",
    "_Еще варианты? Не, реально попробуй, я подожду._",
    "_Я состою из 200 строк кода и то умнее тебя._",
    "_Давай по душам, ты в школе учился?_",
];

/// Formats the result of a dice roll.
///
/// Values are emphasized and joined in the order they were drawn.
///
/// # Examples
///
/// ```
/// # use roller_bot::commands::text_response::format_roll;
/// assert_eq!(format_roll(&[3, 1]), "Кубик брошен. Выпало *3*, *1*.");
/// ```
pub fn format_roll(values: &[usize]) -> String {
    let values = values
        .iter()
        .map(|value| format!("*{}*", value))
        .collect::<Vec<String>>()
        .join(", ");

    format!("Кубик брошен. Выпало {}.", values)
}

/// Formats the option picked by the sample command.
pub fn format_sample(item: &str) -> String {
    format!("Я выбрал *{}*.", item)
}

/// Formats the answer to a sample command with fewer than two options.
pub fn format_not_enough_options() -> String {
    "Мне нужно хотя бы два варианта, чтобы было из чего выбирать.".to_owned()
}

/// Formats the help message.
///
/// The message describes the `roll` and `sample` commands with literal
/// examples and lists the aliases the bot understands.
pub fn format_help() -> String {
    let body = ":game_die: *Что я умею:*\n\
        - `roll <грани> <количество>`: бросить кубик. По умолчанию 5 граней и 1 бросок, \
        граней от 2 до 10000000, бросков не больше 20.\n\
        - `sample <вариант> <вариант> ...`: выбрать один вариант случайно. \
        Варианты из нескольких слов бери в кавычки.\n\
        - `help`: показать эту подсказку.\n\n\
        Примеры:\n\
        - `roll` :arrow_right: один бросок кубика с 5 гранями\n\
        - `roll 20 3` :arrow_right: три броска кубика с 20 гранями\n\
        - `sample Вася Петя \"Нина Ивановна\"` :arrow_right: выберу одного из троих\n\n\
        Еще понимаю: `брось`, `бросить`, `кинь`, `random`, `выбери`, `usage`, `помощь`, `помоги`.";

    body.to_owned()
}

/// Formats the answer to an unknown command while the user still gets the
/// benefit of the doubt.
pub fn format_unknown_command() -> String {
    "Ничего не понял, напиши roll и я кину кубик.".to_owned()
}

/// Formats the greeting sent when the bot joins a room.
pub fn format_greeting() -> String {
    "Всем чмоке в этом чате!".to_owned()
}
