use point_art_hub::format::words::{amount_to_words, integer_words, number_to_words, number_to_words_in};

#[test]
fn zero_is_spelled_out() {
    assert_eq!(number_to_words(0), "Zero Shillings Only");
}

#[test]
fn invoice_amounts() {
    assert_eq!(
        number_to_words(150_000),
        "One Hundred Fifty Thousand Shillings Only"
    );
    assert_eq!(number_to_words(1), "One Shillings Only");
    assert_eq!(number_to_words(19), "Nineteen Shillings Only");
    assert_eq!(number_to_words(20), "Twenty Shillings Only");
    assert_eq!(number_to_words(101), "One Hundred One Shillings Only");
    assert_eq!(
        number_to_words(1_000_001),
        "One Million One Shillings Only"
    );
    assert_eq!(
        number_to_words(2_500_750),
        "Two Million Five Hundred Thousand Seven Hundred Fifty Shillings Only"
    );
}

#[test]
fn billions_and_beyond() {
    assert_eq!(integer_words(3_000_000_000), "Three Billion");
    assert_eq!(
        integer_words(1_000_000_000_000),
        "One Thousand Billion"
    );
}

#[test]
fn no_digits_for_any_integer() {
    let samples = [
        0u64,
        7,
        13,
        99,
        100,
        999,
        1_000,
        12_345,
        999_999,
        1_000_000,
        987_654_321,
        1_000_000_000,
        123_456_789_012,
        u64::MAX,
    ];
    for n in samples {
        let words = number_to_words(n);
        assert!(
            !words.chars().any(|c| c.is_ascii_digit()),
            "{n} rendered with digits: {words}"
        );
        assert!(words.ends_with("Shillings Only"));
        assert!(!words.contains("  "), "double space for {n}: {words}");
    }
    for n in (0..2_000u64).chain(999_000..1_001_000) {
        assert!(!number_to_words(n).chars().any(|c| c.is_ascii_digit()));
    }
}

#[test]
fn fractional_and_invalid_amounts() {
    assert_eq!(
        amount_to_words(1_250.99, "Shillings"),
        "One Thousand Two Hundred Fifty Shillings Only"
    );
    assert_eq!(amount_to_words(-5.0, "Shillings"), "Zero Shillings Only");
    assert_eq!(amount_to_words(f64::NAN, "Shillings"), "Zero Shillings Only");
    assert_eq!(amount_to_words(0.4, "Shillings"), "Zero Shillings Only");
}

#[test]
fn currency_is_configurable() {
    assert_eq!(number_to_words_in(42, "Dollars"), "Forty Two Dollars Only");
}
