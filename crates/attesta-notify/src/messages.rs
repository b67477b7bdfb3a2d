//! Outbound message templates (HTML parse mode).

use attesta_core::LinkButton;
use attesta_db::ExamDetails;

/// "завтра" / "через N дня(ей)" for a reminder offset.
pub fn when_text(days_left: i64) -> String {
    match days_left {
        1 => "завтра".to_string(),
        n => format!("через {n} {}", days_word(n)),
    }
}

fn days_word(n: i64) -> &'static str {
    let tens = n % 100;
    if (12..=14).contains(&tens) {
        return "дней";
    }
    match n % 10 {
        1 => "день",
        2..=4 => "дня",
        _ => "дней",
    }
}

pub fn reminder(exam: &ExamDetails, days_left: i64) -> String {
    format!(
        "⏰ Напоминание\n\
         📚 {kind} по <b>{discipline}</b> {when}!\n\
         📅 Дата: {date}\n\
         👨‍🏫 Преподаватель: {curator}",
        kind = exam.exam_kind().label(),
        discipline = exam.discipline,
        when = when_text(days_left),
        date = exam.holding_date,
        curator = exam.curator_full_name(),
    )
}

pub fn exam_created(exam: &ExamDetails) -> String {
    let kind = exam.exam_kind().label();
    format!(
        "🆕 <b>Добавлен новый {kind_lower}!</b>\n\n\
         📚 Дисциплина: <b>{discipline}</b>\n\
         👨‍🏫 Преподаватель: <b>{curator}</b>\n\
         📅 Дата проведения: <b>{date}</b>\n\n\
         📌 Проверь расписание и подготовься заранее!",
        kind_lower = kind.to_lowercase(),
        discipline = exam.discipline,
        curator = exam.curator_full_name(),
        date = exam.holding_date,
    )
}

/// Link-attached ticket announcement plus its inline button.
pub fn exam_link(exam: &ExamDetails, link: &str) -> (String, LinkButton) {
    let kind = exam.exam_kind().label();
    let text = format!(
        "📢 <b>Внимание!</b>\n\n\
         📚 {kind} по дисциплине <b>{discipline}</b>\n\
         👨‍🏫 Преподаватель: <b>{curator}</b>\n\
         📅 Дата: <b>{date}</b>\n\n\
         🎫 Был прикреплён билет.\n\n\
         🍀 Удачи на {kind_lower}е! 💪",
        kind = kind,
        discipline = exam.discipline,
        curator = exam.curator_full_name(),
        date = exam.holding_date,
        kind_lower = kind.to_lowercase(),
    );
    let button = LinkButton {
        label: "Открыть билет".to_string(),
        url: link.to_string(),
    };
    (text, button)
}

pub fn mark_changed(discipline: &str, value: Option<i16>) -> String {
    let mark_text = value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "н/а".to_string());
    format!(
        "🎓 Ваша оценка по предмету <b>{discipline}</b> обновлена:\n\
         ⭐ Оценка: <b>{mark_text}</b>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_text_declension() {
        assert_eq!(when_text(1), "завтра");
        assert_eq!(when_text(3), "через 3 дня");
        assert_eq!(when_text(5), "через 5 дней");
        assert_eq!(when_text(21), "через 21 день");
        assert_eq!(when_text(12), "через 12 дней");
    }

    #[test]
    fn mark_text_falls_back_for_ungraded() {
        assert!(mark_changed("Математика", None).contains("н/а"));
        assert!(mark_changed("Математика", Some(5)).contains("<b>5</b>"));
    }
}
