//! The static table of supported currencies and helpers for formatting money.

use numfmt::{Formatter, Precision};

/// A currency the backend accepts for cashboxes and transactions.
#[derive(Debug, PartialEq, Eq)]
pub struct Currency {
    /// ISO 4217 code, e.g. "UAH".
    pub code: &'static str,
    /// Display name, e.g. "Ukrainian Hryvnia".
    pub name: &'static str,
    /// The symbol shown with amounts.
    pub symbol: &'static str,
    /// The BCP 47 locale whose separators and symbol placement [format_amount] follows.
    pub locale: &'static str,
}

macro_rules! currency {
    ($code:literal, $name:literal, $symbol:literal, $locale:literal) => {
        Currency {
            code: $code,
            name: $name,
            symbol: $symbol,
            locale: $locale,
        }
    };
}

/// Every currency a user can pick, ordered by code.
pub const CURRENCIES: &[Currency] = &[
    currency!("AED", "Emirati Dirham", "د.إ", "ar-AE"),
    currency!("AFN", "Afghan Afghani", "؋", "fa-AF"),
    currency!("ALL", "Albanian Lek", "L", "sq-AL"),
    currency!("AMD", "Armenian Dram", "֏", "hy-AM"),
    currency!("ANG", "Dutch Guilder", "ƒ", "nl-CW"),
    currency!("AOA", "Angolan Kwanza", "Kz", "pt-AO"),
    currency!("ARS", "Argentine Peso", "$", "es-AR"),
    currency!("AUD", "Australian Dollar", "$", "en-AU"),
    currency!("AZN", "Azerbaijan Manat", "₼", "az-AZ"),
    currency!("BAM", "Bosnian Convertible Mark", "KM", "bs-BA"),
    currency!("BDT", "Bangladeshi Taka", "৳", "bn-BD"),
    currency!("BGN", "Bulgarian Lev", "лв", "bg-BG"),
    currency!("BHD", "Bahraini Dinar", ".د.ب", "ar-BH"),
    currency!("BIF", "Burundian Franc", "FBu", "fr-BI"),
    currency!("BMD", "Bermudian Dollar", "$", "en-BM"),
    currency!("BND", "Bruneian Dollar", "$", "ms-BN"),
    currency!("BOB", "Bolivian Bolíviano", "Bs.", "es-BO"),
    currency!("BRL", "Brazilian Real", "R$", "pt-BR"),
    currency!("BSD", "Bahamian Dollar", "$", "en-BS"),
    currency!("BTN", "Bhutanese Ngultrum", "Nu.", "dz-BT"),
    currency!("BWP", "Botswana Pula", "P", "en-BW"),
    currency!("BYN", "Belarusian Ruble", "Br", "be-BY"),
    currency!("CAD", "Canadian Dollar", "$", "en-CA"),
    currency!("CHF", "Swiss Franc", "CHF", "de-CH"),
    currency!("CLP", "Chilean Peso", "$", "es-CL"),
    currency!("CNY", "Chinese Yuan Renminbi", "¥", "zh-CN"),
    currency!("COP", "Colombian Peso", "$", "es-CO"),
    currency!("CRC", "Costa Rican Colon", "₡", "es-CR"),
    currency!("CZK", "Czech Koruna", "Kč", "cs-CZ"),
    currency!("DKK", "Danish Krone", "kr", "da-DK"),
    currency!("DOP", "Dominican Peso", "RD$", "es-DO"),
    currency!("DZD", "Algerian Dinar", "دج", "ar-DZ"),
    currency!("EGP", "Egyptian Pound", "£", "ar-EG"),
    currency!("EUR", "Euro", "€", "de-DE"),
    currency!("GBP", "British Pound", "£", "en-GB"),
    currency!("GEL", "Georgian Lari", "₾", "ka-GE"),
    currency!("GHS", "Ghanaian Cedi", "₵", "en-GH"),
    currency!("HKD", "Hong Kong Dollar", "$", "zh-HK"),
    currency!("HRK", "Croatian Kuna", "kn", "hr-HR"),
    currency!("HUF", "Hungarian Forint", "Ft", "hu-HU"),
    currency!("IDR", "Indonesian Rupiah", "Rp", "id-ID"),
    currency!("ILS", "Israeli Shekel", "₪", "he-IL"),
    currency!("INR", "Indian Rupee", "₹", "en-IN"),
    currency!("IQD", "Iraqi Dinar", "ع.د", "ar-IQ"),
    currency!("IRR", "Iranian Rial", "﷼", "fa-IR"),
    currency!("ISK", "Icelandic Krona", "kr", "is-IS"),
    currency!("JMD", "Jamaican Dollar", "J$", "en-JM"),
    currency!("JOD", "Jordanian Dinar", "د.ا", "ar-JO"),
    currency!("JPY", "Japanese Yen", "¥", "ja-JP"),
    currency!("KES", "Kenyan Shilling", "KSh", "sw-KE"),
    currency!("KGS", "Kyrgyzstani Som", "с", "ky-KG"),
    currency!("KHR", "Cambodian Riel", "៛", "km-KH"),
    currency!("KRW", "South Korean Won", "₩", "ko-KR"),
    currency!("KWD", "Kuwaiti Dinar", "د.ك", "ar-KW"),
    currency!("KZT", "Kazakhstani Tenge", "₸", "kk-KZ"),
    currency!("LAK", "Lao Kip", "₭", "lo-LA"),
    currency!("LBP", "Lebanese Pound", "ل.ل", "ar-LB"),
    currency!("LKR", "Sri Lankan Rupee", "Rs", "si-LK"),
    currency!("LYD", "Libyan Dinar", "ل.د", "ar-LY"),
    currency!("MAD", "Moroccan Dirham", "د.م.", "ar-MA"),
    currency!("MDL", "Moldovan Leu", "L", "ro-MD"),
    currency!("MKD", "Macedonian Denar", "ден", "mk-MK"),
    currency!("MMK", "Burmese Kyat", "K", "my-MM"),
    currency!("MNT", "Mongolian Tughrik", "₮", "mn-MN"),
    currency!("MXN", "Mexican Peso", "$", "es-MX"),
    currency!("MYR", "Malaysian Ringgit", "RM", "ms-MY"),
    currency!("MZN", "Mozambican Metical", "MT", "pt-MZ"),
    currency!("NAD", "Namibian Dollar", "$", "en-NA"),
    currency!("NGN", "Nigerian Naira", "₦", "en-NG"),
    currency!("NZD", "New Zealand Dollar", "$", "en-NZ"),
    currency!("OMR", "Omani Rial", "ر.ع.", "ar-OM"),
    currency!("PEN", "Peruvian Sol", "S/.", "es-PE"),
    currency!("PHP", "Philippine Peso", "₱", "en-PH"),
    currency!("PKR", "Pakistani Rupee", "Rs", "ur-PK"),
    currency!("PLN", "Polish Zloty", "zł", "pl-PL"),
    currency!("QAR", "Qatari Riyal", "ر.ق", "ar-QA"),
    currency!("RON", "Romanian Leu", "lei", "ro-RO"),
    currency!("RSD", "Serbian Dinar", "дин", "sr-RS"),
    currency!("SAR", "Saudi Riyal", "﷼", "ar-SA"),
    currency!("SEK", "Swedish Krona", "kr", "sv-SE"),
    currency!("SGD", "Singapore Dollar", "$", "en-SG"),
    currency!("THB", "Thai Baht", "฿", "th-TH"),
    currency!("TRY", "Turkish Lira", "₺", "tr-TR"),
    currency!("UAH", "Ukrainian Hryvnia", "₴", "uk-UA"),
    currency!("USD", "US Dollar", "$", "en-US"),
    currency!("VND", "Vietnamese Dong", "₫", "vi-VN"),
    currency!("ZAR", "South African Rand", "R", "en-ZA"),
];

/// The currency used when a session carries a code that is not in [CURRENCIES].
pub static DEFAULT_CURRENCY: &Currency = &currency!("USD", "US Dollar", "$", "en-US");

/// Look up a currency by its code, ignoring case.
pub fn find_currency(code: &str) -> Option<&'static Currency> {
    let code = code.trim();

    CURRENCIES
        .iter()
        .find(|currency| currency.code.eq_ignore_ascii_case(code))
}

/// Where a locale puts the currency symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolPosition {
    /// "$1,234.50"
    Before,
    /// "R$ 1.234,50"
    BeforeSpaced,
    /// "1 234,50 ₴"
    After,
}

/// How a locale writes money amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberStyle {
    /// The digit group separator. numfmt only takes single byte separators,
    /// so locales that group with a no-break space get a plain space.
    group: char,
    decimal: char,
    symbol: SymbolPosition,
}

impl NumberStyle {
    const fn new(group: char, decimal: char, symbol: SymbolPosition) -> Self {
        Self {
            group,
            decimal,
            symbol,
        }
    }
}

/// The conventions of a BCP 47 `locale` such as "uk-UA", following CLDR for
/// the locales in [CURRENCIES]. Anything else is written the English way.
fn number_style(locale: &str) -> NumberStyle {
    use SymbolPosition::{After, Before, BeforeSpaced};

    let (language, region) = locale.split_once('-').unwrap_or((locale, ""));

    match (language, region) {
        ("de", "CH") => NumberStyle::new('\'', '.', BeforeSpaced),
        ("es", "MX" | "DO" | "PE") => NumberStyle::new(',', '.', Before),
        ("es", "CR") => NumberStyle::new(' ', ',', Before),
        ("es", _) | ("pt", "BR") | ("nl", _) | ("id", _) => NumberStyle::new('.', ',', BeforeSpaced),
        ("tr", _) => NumberStyle::new('.', ',', Before),
        ("pt", _) => NumberStyle::new(' ', ',', After),
        ("de" | "da" | "is" | "ro" | "hr" | "sr" | "mk" | "bs" | "az" | "vi", _) => {
            NumberStyle::new('.', ',', After)
        }
        (
            "uk" | "be" | "bg" | "cs" | "pl" | "sv" | "hu" | "kk" | "ky" | "ka" | "hy" | "sq"
            | "fr",
            _,
        ) => NumberStyle::new(' ', ',', After),
        _ => NumberStyle::new(',', '.', Before),
    }
}

/// Format `amount` with two decimal places the way the locale of `currency`
/// writes money, e.g. "$1,234.50", "1 234,50 ₴" or "-3,00 €".
pub fn format_amount(amount: f64, currency: &Currency) -> String {
    let style = number_style(currency.locale);
    // numfmt truncates to the precision instead of rounding.
    let rounded = (amount.abs() * 100.0).round() / 100.0;
    let sign = if amount < 0.0 && rounded > 0.0 { "-" } else { "" };
    let amount = rounded;

    let digits = if amount == 0.0 {
        // Zero is hardcoded as "0" by numfmt.
        format!("0{}00", style.decimal)
    } else {
        let formatter = Formatter::new()
            .separator(style.group)
            .map(|formatter| {
                formatter
                    .comma(style.decimal == ',')
                    .precision(Precision::Decimals(2))
            });

        match formatter {
            Ok(formatter) => pad_cents(&formatter.fmt_string(amount), style.decimal),
            Err(error) => {
                tracing::warn!(
                    "Could not build a formatter for {}: {error:?}. Falling back to the currency code.",
                    currency.code
                );
                return format!("{sign}{amount:.2} {}", currency.code);
            }
        }
    };

    match style.symbol {
        SymbolPosition::Before => format!("{sign}{}{digits}", currency.symbol),
        SymbolPosition::BeforeSpaced => format!("{sign}{} {digits}", currency.symbol),
        SymbolPosition::After => format!("{sign}{digits} {}", currency.symbol),
    }
}

/// numfmt drops trailing zeros in the fractional part, e.g. "12.3" or "12",
/// so pad the fraction back out to exactly two digits.
fn pad_cents(formatted: &str, decimal: char) -> String {
    match formatted.rsplit_once(decimal) {
        Some((whole, fraction)) if fraction.chars().all(|c| c.is_ascii_digit()) => {
            format!("{whole}{decimal}{fraction:0<2}")
        }
        _ => format!("{formatted}{decimal}00"),
    }
}

#[cfg(test)]
mod tests {
    use super::{CURRENCIES, find_currency, format_amount, pad_cents};

    #[test]
    fn currency_codes_are_unique_and_sorted() {
        for pair in CURRENCIES.windows(2) {
            assert!(
                pair[0].code < pair[1].code,
                "{} should come before {}",
                pair[0].code,
                pair[1].code
            );
        }
    }

    #[test]
    fn find_currency_ignores_case() {
        let currency = find_currency("uah").expect("UAH should be supported");

        assert_eq!(currency.code, "UAH");
        assert_eq!(currency.symbol, "₴");
    }

    #[test]
    fn find_currency_rejects_unknown_code() {
        assert_eq!(find_currency("XYZ"), None);
    }

    #[test]
    fn formats_zero() {
        let usd = find_currency("USD").unwrap();
        let uah = find_currency("UAH").unwrap();

        assert_eq!(format_amount(0.0, usd), "$0.00");
        assert_eq!(format_amount(0.0, uah), "0,00 ₴");
    }

    #[test]
    fn formats_negative_amount_with_leading_sign() {
        let usd = find_currency("USD").unwrap();

        assert_eq!(format_amount(-3.5, usd), "-$3.50");
        assert_eq!(format_amount(-0.001, usd), "$0.00");
    }

    #[test]
    fn follows_the_currency_locale() {
        let cases = [
            ("USD", 1234.5, "$1,234.50"),
            ("UAH", 1234.5, "1 234,50 ₴"),
            ("EUR", 1234567.891, "1.234.567,89 €"),
            ("BRL", 1234.5, "R$ 1.234,50"),
            ("CHF", 1234.5, "CHF 1'234.50"),
            ("PLN", -12.0, "-12,00 zł"),
        ];

        for (code, amount, want) in cases {
            let currency = find_currency(code).unwrap();

            assert_eq!(format_amount(amount, currency), want, "formatting {code}");
        }
    }

    #[test]
    fn rounds_to_cents() {
        let usd = find_currency("USD").unwrap();

        assert_eq!(format_amount(2.675_1, usd), "$2.68");
    }

    #[test]
    fn pads_fraction_to_two_digits() {
        assert_eq!(pad_cents("12.3", '.'), "12.30");
        assert_eq!(pad_cents("12", '.'), "12.00");
        assert_eq!(pad_cents("1,234.56", '.'), "1,234.56");
        assert_eq!(pad_cents("1.234", ','), "1.234,00");
        assert_eq!(pad_cents("1 234,5", ','), "1 234,50");
    }
}
