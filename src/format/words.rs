//! Currency amounts as English words for printed invoices:
//! `150000` -> "One Hundred Fifty Thousand Shillings Only".

pub const DEFAULT_CURRENCY: &str = "Shillings";

const ONES: [&str; 20] = [
    "",
    "One",
    "Two",
    "Three",
    "Four",
    "Five",
    "Six",
    "Seven",
    "Eight",
    "Nine",
    "Ten",
    "Eleven",
    "Twelve",
    "Thirteen",
    "Fourteen",
    "Fifteen",
    "Sixteen",
    "Seventeen",
    "Eighteen",
    "Nineteen",
];

const TENS: [&str; 10] = [
    "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

const SCALES: [(u64, &str); 3] = [
    (1_000_000_000, "Billion"),
    (1_000_000, "Million"),
    (1_000, "Thousand"),
];

/// Words for 1..=999; empty for 0.
fn group_words(n: u64, out: &mut Vec<&'static str>) {
    let hundreds = n / 100;
    let rest = n % 100;
    if hundreds > 0 {
        out.push(ONES[hundreds as usize]);
        out.push("Hundred");
    }
    if rest >= 20 {
        out.push(TENS[(rest / 10) as usize]);
        if rest % 10 > 0 {
            out.push(ONES[(rest % 10) as usize]);
        }
    } else if rest > 0 {
        out.push(ONES[rest as usize]);
    }
}

fn push_words(mut n: u64, out: &mut Vec<&'static str>) {
    for (scale, name) in SCALES {
        let count = n / scale;
        if count == 0 {
            continue;
        }
        if count >= 1000 {
            // only reachable for billions
            push_words(count, out);
        } else {
            group_words(count, out);
        }
        out.push(name);
        n %= scale;
    }
    group_words(n, out);
}

/// Spell out a whole number without a currency suffix. `0` is "Zero".
pub fn integer_words(n: u64) -> String {
    if n == 0 {
        return "Zero".to_string();
    }
    let mut words = Vec::new();
    push_words(n, &mut words);
    words.join(" ")
}

/// `"{words} {currency} Only"`.
pub fn number_to_words_in(n: u64, currency: &str) -> String {
    format!("{} {currency} Only", integer_words(n))
}

/// Invoice wording in the default currency.
pub fn number_to_words(n: u64) -> String {
    number_to_words_in(n, DEFAULT_CURRENCY)
}

/// Fractional amounts are truncated to whole units; negative or non-finite input reads as zero.
pub fn amount_to_words(amount: f64, currency: &str) -> String {
    let whole = if amount.is_finite() && amount > 0.0 {
        amount.trunc() as u64
    } else {
        0
    };
    number_to_words_in(whole, currency)
}
