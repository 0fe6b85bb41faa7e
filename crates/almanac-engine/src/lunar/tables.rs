//! Packed historical tables backing the lunisolar engine.
//!
//! Every table is kept in its packed form; the accessor functions below are
//! the only code that knows the bit layouts.

/// First year covered by [`LUNAR_MONTH_DATA`] and [`LUNAR_NEW_YEAR_DATA`].
pub const LUNAR_FIRST_YEAR: i32 = 1900;

/// First year covered by [`SOLAR_TERM_DATA`].
pub const SOLAR_TERM_FIRST_YEAR: i32 = 1901;

/// Last year covered by every table.
pub const LAST_YEAR: i32 = 2100;

const LEAP_MONTH_SHIFT: u32 = 13;
const LEAP_MONTH_DAYS_BIT: u32 = 12;

/// Lunar month table, one word per year.
///
/// ```text
/// bits 13..   leap month number (0 = no leap month)
/// bit  12     leap month has 30 days
/// bits 0..=11 bit i set => month i + 1 has 30 days, else 29
/// ```
///
/// The length of the twelfth month of 2100 is not known; the table stores 29.
pub static LUNAR_MONTH_DATA: [u32; 201] = [
    0x10bd2, // 1900
    0x00752, 0x00ea5, 0x0ab2a, 0x0064b, 0x00a9b, 0x09aa6, 0x0056a, 0x00b59, 0x04baa, 0x00752, // 1901-1910
    0x0cda5, 0x00b25, 0x00a4b, 0x0ba4b, 0x002ad, 0x0056b, 0x045b5, 0x00da9, 0x0fe92, 0x00e92, // 1911-1920
    0x00d25, 0x0ad2d, 0x00a56, 0x002b6, 0x09ad5, 0x006d4, 0x00ea9, 0x04f4a, 0x00e92, 0x0c6a6, // 1921-1930
    0x0052b, 0x00a57, 0x0b956, 0x00b5a, 0x006d4, 0x07761, 0x00749, 0x0fb13, 0x00a93, 0x0052b, // 1931-1940
    0x0d51b, 0x00aad, 0x0056a, 0x09da5, 0x00ba4, 0x00b49, 0x04d4b, 0x00a95, 0x0eaad, 0x00536, // 1941-1950
    0x00aad, 0x0baca, 0x005b2, 0x00da5, 0x07ea2, 0x00d4a, 0x10595, 0x00a97, 0x00556, 0x0c575, // 1951-1960
    0x00ad5, 0x006d2, 0x08755, 0x00ea5, 0x0064a, 0x0664f, 0x00a9b, 0x0eada, 0x0056a, 0x00b69, // 1961-1970
    0x0abb2, 0x00b52, 0x00b25, 0x08b2b, 0x00a4b, 0x10aab, 0x002ad, 0x0056d, 0x0d5a9, 0x00da9, // 1971-1980
    0x00d92, 0x08e95, 0x00d25, 0x14e4d, 0x00a56, 0x002b6, 0x0c2f5, 0x006d5, 0x00ea9, 0x0af52, // 1981-1990
    0x00e92, 0x00d26, 0x0652e, 0x00a57, 0x10ad6, 0x0035a, 0x006d5, 0x0ab69, 0x00749, 0x00693, // 1991-2000
    0x08a9b, 0x0052b, 0x00a5b, 0x04aae, 0x0056a, 0x0edd5, 0x00ba4, 0x00b49, 0x0ad53, 0x00a95, // 2001-2010
    0x0052d, 0x0855d, 0x00ab5, 0x12baa, 0x005d2, 0x00da5, 0x0de8a, 0x00d4a, 0x00c95, 0x08a9e, // 2011-2020
    0x00556, 0x00ab5, 0x04ada, 0x006d2, 0x0c765, 0x00725, 0x0064b, 0x0a657, 0x00cab, 0x0055a, // 2021-2030
    0x0656e, 0x00b69, 0x16f52, 0x00b52, 0x00b25, 0x0dd0b, 0x00a4b, 0x004ab, 0x0a2bb, 0x005ad, // 2031-2040
    0x00b6a, 0x04daa, 0x00d92, 0x0eea5, 0x00d25, 0x00a55, 0x0ba4d, 0x004b6, 0x005b5, 0x076d2, // 2041-2050
    0x00ec9, 0x10f92, 0x00e92, 0x00d26, 0x0d516, 0x00a57, 0x00556, 0x09365, 0x00755, 0x00749, // 2051-2060
    0x0674b, 0x00693, 0x0eaab, 0x0052b, 0x00a5b, 0x0aaba, 0x0056a, 0x00b65, 0x08baa, 0x00b4a, // 2061-2070
    0x10d95, 0x00a95, 0x0052d, 0x0c56d, 0x00ab5, 0x005aa, 0x085d5, 0x00da5, 0x00d4a, 0x06e4d, // 2071-2080
    0x00c96, 0x0ecce, 0x00556, 0x00ab5, 0x0bad2, 0x006d2, 0x00ea5, 0x0872a, 0x0068b, 0x10697, // 2081-2090
    0x004ab, 0x0055b, 0x0d556, 0x00b6a, 0x00752, 0x08b95, 0x00b45, 0x00a8b, 0x04a4f, 0x004ab, // 2091-2100
];

/// Gregorian date of the lunar new year, one byte per year.
///
/// ```text
/// bits 5..=6  month
/// bits 0..=4  day of month
/// ```
pub static LUNAR_NEW_YEAR_DATA: [u8; 201] = [
    0x3f, // 1900
    0x53, 0x48, 0x3d, 0x50, 0x44, 0x39, 0x4d, 0x42, 0x36, 0x4a, // 1901-1910
    0x3e, 0x52, 0x46, 0x3a, 0x4e, 0x43, 0x37, 0x4b, 0x41, 0x54, // 1911-1920
    0x48, 0x3c, 0x50, 0x45, 0x38, 0x4d, 0x42, 0x37, 0x4a, 0x3e, // 1921-1930
    0x51, 0x46, 0x3a, 0x4e, 0x44, 0x38, 0x4b, 0x3f, 0x53, 0x48, // 1931-1940
    0x3b, 0x4f, 0x45, 0x39, 0x4d, 0x42, 0x36, 0x4a, 0x3d, 0x51, // 1941-1950
    0x46, 0x3b, 0x4e, 0x43, 0x38, 0x4c, 0x3f, 0x52, 0x48, 0x3c, // 1951-1960
    0x4f, 0x45, 0x39, 0x4d, 0x42, 0x35, 0x49, 0x3e, 0x51, 0x46, // 1961-1970
    0x3b, 0x4f, 0x43, 0x37, 0x4b, 0x3f, 0x52, 0x47, 0x3c, 0x50, // 1971-1980
    0x45, 0x39, 0x4d, 0x42, 0x54, 0x49, 0x3d, 0x51, 0x46, 0x3b, // 1981-1990
    0x4f, 0x44, 0x37, 0x4a, 0x3f, 0x53, 0x47, 0x3c, 0x50, 0x45, // 1991-2000
    0x38, 0x4c, 0x41, 0x36, 0x49, 0x3d, 0x52, 0x47, 0x3a, 0x4e, // 2001-2010
    0x43, 0x37, 0x4a, 0x3f, 0x53, 0x48, 0x3c, 0x50, 0x45, 0x39, // 2011-2020
    0x4c, 0x41, 0x36, 0x4a, 0x3d, 0x51, 0x46, 0x3a, 0x4d, 0x43, // 2021-2030
    0x37, 0x4b, 0x3f, 0x53, 0x48, 0x3c, 0x4f, 0x44, 0x38, 0x4c, // 2031-2040
    0x41, 0x36, 0x4a, 0x3e, 0x51, 0x46, 0x3a, 0x4e, 0x42, 0x37, // 2041-2050
    0x4b, 0x41, 0x53, 0x48, 0x3c, 0x4f, 0x44, 0x38, 0x4c, 0x42, // 2051-2060
    0x35, 0x49, 0x3d, 0x51, 0x45, 0x3a, 0x4e, 0x43, 0x37, 0x4b, // 2061-2070
    0x3f, 0x53, 0x47, 0x3b, 0x4f, 0x45, 0x38, 0x4c, 0x42, 0x36, // 2071-2080
    0x49, 0x3d, 0x51, 0x46, 0x3a, 0x4e, 0x43, 0x38, 0x4a, 0x3e, // 2081-2090
    0x52, 0x47, 0x3b, 0x4f, 0x45, 0x39, 0x4c, 0x41, 0x35, 0x49, // 2091-2100
];

/// Smallest day of month each solar term has fallen on in 1901-2100, in
/// calendar order starting from minor cold (小寒).
pub static SOLAR_TERM_BASE_DAYS: [u32; 24] = [
    4, 19, 3, 18, 4, 19, 4, 19, 4, 20, 4, 20, 6, 22, 6, 22, 6, 22, 7, 22, 6, 21, 6, 21,
];

/// Solar term offsets, one word per year. Term `i` occupies bits
/// `2 * i..2 * i + 2` and is added to `SOLAR_TERM_BASE_DAYS[i]`.
/// Source: Hong Kong Observatory almanac.
pub static SOLAR_TERM_DATA: [u64; 200] = [
    0x6aaaa6aa9a5a, 0xaaaaaabaaa6a, 0xaaabbabbafaa, 0x5aa665a65aab, // 1901-1904
    0x6aaaa6aa9a5a, 0xaaaaaaaaaa6a, 0xaaabbabbafaa, 0x5aa665a65aab, // 1905-1908
    0x6aaaa6aa9a5a, 0xaaaaaaaaaa6a, 0xaaabbabbafaa, 0x5aa665a65aab, // 1909-1912
    0x6aaaa6aa9a56, 0xaaaaaaaa9a5a, 0xaaabaabaaeaa, 0x569665a65aaa, // 1913-1916
    0x5aa6a6a69a56, 0x6aaaaaaa9a5a, 0xaaabaabaaeaa, 0x569665a65aaa, // 1917-1920
    0x5aa6a6a65a56, 0x6aaaaaaa9a5a, 0xaaabaabaaa6a, 0x569665a65aaa, // 1921-1924
    0x5aa6a6a65a56, 0x6aaaa6aa9a5a, 0xaaaaaabaaa6a, 0x555665665aaa, // 1925-1928
    0x5aa665a65a56, 0x6aaaa6aa9a5a, 0xaaaaaabaaa6a, 0x555665665aaa, // 1929-1932
    0x5aa665a65a56, 0x6aaaa6aa9a5a, 0xaaaaaaaaaa6a, 0x555665665aaa, // 1933-1936
    0x5aa665a65a56, 0x6aaaa6aa9a5a, 0xaaaaaaaaaa6a, 0x555665665aaa, // 1937-1940
    0x5aa665a65a56, 0x6aaaa6aa9a5a, 0xaaaaaaaaaa6a, 0x555665655aaa, // 1941-1944
    0x569665a65a56, 0x6aa6a6aa9a56, 0xaaaaaaaa9a5a, 0x5556556559aa, // 1945-1948
    0x569665a65a55, 0x6aa6a6a65a56, 0xaaaaaaaa9a5a, 0x5556556559aa, // 1949-1952
    0x569665a65a55, 0x5aa6a6a65a56, 0x6aaaa6aa9a5a, 0x5556556555aa, // 1953-1956
    0x569665a65a55, 0x5aa665a65a56, 0x6aaaa6aa9a5a, 0x55555565556a, // 1957-1960
    0x555665665a55, 0x5aa665a65a56, 0x6aaaa6aa9a5a, 0x55555565556a, // 1961-1964
    0x555665665a55, 0x5aa665a65a56, 0x6aaaa6aa9a5a, 0x55555555556a, // 1965-1968
    0x555665665a55, 0x5aa665a65a56, 0x6aaaa6aa9a5a, 0x55555555556a, // 1969-1972
    0x555665655a55, 0x5aa665a65a56, 0x6aa6a6aa9a5a, 0x55555555456a, // 1973-1976
    0x555655655a55, 0x5a9665a65a56, 0x6aa6a6a69a5a, 0x55555555456a, // 1977-1980
    0x555655655a55, 0x569665a65a56, 0x6aa6a6a65a56, 0x55555155455a, // 1981-1984
    0x555655655955, 0x569665a65a55, 0x5aa6a5a65a56, 0x15555155455a, // 1985-1988
    0x555555655555, 0x569665665a55, 0x5aa665a65a56, 0x15555155455a, // 1989-1992
    0x555555655515, 0x555665665a55, 0x5aa665a65a56, 0x15555155455a, // 1993-1996
    0x555555555515, 0x555665665a55, 0x5aa665a65a56, 0x15555155455a, // 1997-2000
    0x555555555515, 0x555665665a55, 0x5aa665a65a56, 0x15555155455a, // 2001-2004
    0x555555555515, 0x555655655a55, 0x5aa665a65a56, 0x15515155455a, // 2005-2008
    0x555555554515, 0x555655655a55, 0x5a9665a65a56, 0x15515151455a, // 2009-2012
    0x555551554515, 0x555655655a55, 0x569665a65a56, 0x155151510556, // 2013-2016
    0x555551554505, 0x555655655955, 0x569665665a55, 0x155110510556, // 2017-2020
    0x155551554505, 0x555555655555, 0x569665665a55, 0x055110510556, // 2021-2024
    0x155551554505, 0x555555555515, 0x555665665a55, 0x055110510556, // 2025-2028
    0x155551554505, 0x555555555515, 0x555665665a55, 0x055110510556, // 2029-2032
    0x155551554505, 0x555555555515, 0x555655655a55, 0x055110510556, // 2033-2036
    0x155551554505, 0x555555555515, 0x555655655a55, 0x055110510556, // 2037-2040
    0x155151514505, 0x555555554515, 0x555655655a55, 0x054110510556, // 2041-2044
    0x155151510505, 0x555551554515, 0x555655655a55, 0x014110110556, // 2045-2048
    0x155110510501, 0x555551554505, 0x555555655555, 0x014110110555, // 2049-2052
    0x155110510501, 0x555551554505, 0x555555555555, 0x014110110555, // 2053-2056
    0x055110510501, 0x155551554505, 0x555555555555, 0x000110110555, // 2057-2060
    0x055110510501, 0x155551554505, 0x555555555515, 0x000110110555, // 2061-2064
    0x055110510501, 0x155551554505, 0x555555555515, 0x000100100555, // 2065-2068
    0x055110510501, 0x155151514505, 0x555555555515, 0x000100100555, // 2069-2072
    0x054110510501, 0x155151514505, 0x555551554515, 0x000100100555, // 2073-2076
    0x054110510501, 0x155150510505, 0x555551554515, 0x000100100555, // 2077-2080
    0x014110110501, 0x155110510505, 0x555551554505, 0x000000100055, // 2081-2084
    0x014110110500, 0x155110510501, 0x555551554505, 0x000000000055, // 2085-2088
    0x014110110500, 0x055110510501, 0x155551554505, 0x000000000055, // 2089-2092
    0x000110110500, 0x055110510501, 0x155551554505, 0x000000000015, // 2093-2096
    0x000100110500, 0x055110510501, 0x155551554505, 0x555555555515, // 2097-2100
];

/// Auspicious-hour masks indexed by the sexagenary number of the day.
/// Bit `11 - i` covers two-hour slot `i` starting at 子; a set bit marks an
/// inauspicious slot.
pub static LUCKY_HOUR_DATA: [u16; 60] = [
    0x2d3, 0xcb4, 0x32d, 0x4cb, 0xd32, 0xb4c, 0x2d3, 0xcb4, 0x32d, 0x4cb, 0xd22, 0xb5c,
    0x2d3, 0xcb4, 0x32d, 0x4cb, 0xd3a, 0xb4d, 0x2d3, 0xcb4, 0x32d, 0x4cb, 0xd32, 0xb4c,
    0x2d3, 0xcb5, 0x32d, 0x4cb, 0xd32, 0xb4c, 0x2d3, 0xcb4, 0x32d, 0x4cb, 0xd32, 0xb4c,
    0x2d3, 0xcb4, 0x32d, 0x4db, 0xd32, 0xb5c, 0x2d7, 0xcb4, 0x32d, 0x4cb, 0xd32, 0xb5c,
    0x2d3, 0xcb4, 0x32d, 0x4cb, 0xd32, 0xb4c, 0x2d3, 0xcb4, 0x30d, 0x4cb, 0xd32, 0xb4c,
];

fn lunar_index(year: i32) -> Option<usize> {
    if (LUNAR_FIRST_YEAR..=LAST_YEAR).contains(&year) {
        Some((year - LUNAR_FIRST_YEAR) as usize)
    } else {
        None
    }
}

/// Raw lunar month word for `year`.
pub fn lunar_month_word(year: i32) -> Option<u32> {
    lunar_index(year).map(|i| LUNAR_MONTH_DATA[i])
}

/// Leap month number stored in a lunar month word, `0` when there is none.
pub fn leap_month_of(word: u32) -> u32 {
    word >> LEAP_MONTH_SHIFT
}

/// Whether the leap month stored in `word` has 30 days.
pub fn leap_month_is_long(word: u32) -> bool {
    word & (1 << LEAP_MONTH_DAYS_BIT) != 0
}

/// Whether numbered month `month` (1-12) of `word` has 30 days.
pub fn month_is_long(word: u32, month: u32) -> bool {
    (1..=12).contains(&month) && word & (1 << (month - 1)) != 0
}

/// Lunar new year `(month, day)` for `year`.
pub fn lunar_new_year_parts(year: i32) -> Option<(u32, u32)> {
    lunar_index(year).map(|i| {
        let packed = LUNAR_NEW_YEAR_DATA[i];
        (u32::from((packed >> 5) & 0x3), u32::from(packed & 0x1f))
    })
}

/// Raw solar term word for `year`.
pub fn solar_term_word(year: i32) -> Option<u64> {
    if (SOLAR_TERM_FIRST_YEAR..=LAST_YEAR).contains(&year) {
        Some(SOLAR_TERM_DATA[(year - SOLAR_TERM_FIRST_YEAR) as usize])
    } else {
        None
    }
}

/// Day of month of term `index` (0-23) encoded in `word`.
pub fn solar_term_day(word: u64, index: usize) -> u32 {
    ((word >> (index * 2)) & 0x3) as u32 + SOLAR_TERM_BASE_DAYS[index]
}

/// Whether two-hour slot `slot` (0-11) is auspicious for the day with
/// sexagenary number `cycle_index`.
pub fn is_lucky_slot(cycle_index: usize, slot: usize) -> bool {
    LUCKY_HOUR_DATA[cycle_index % 60] & (1 << (11 - slot)) == 0
}
