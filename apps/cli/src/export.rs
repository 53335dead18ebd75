use skipdeck_core::Flashcard;

/// Render flashcards as CSV with a `Front,Back` header. Every value is
/// double-quoted; embedded quotes double per RFC 4180.
pub fn flashcards_to_csv(cards: &[Flashcard]) -> String {
    let mut csv = String::from("Front,Back\n");
    for card in cards {
        csv.push_str(&format!(
            "\"{}\",\"{}\"\n",
            escape(card.front()),
            escape(card.back())
        ));
    }
    csv
}

fn escape(field: &str) -> String {
    field.replace('"', "\"\"")
}
