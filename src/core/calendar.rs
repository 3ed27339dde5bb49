use chrono::{Datelike, Days, Months, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Due day used for countries without a known filing calendar
pub const DEFAULT_DUE_DAY: u32 = 20;

/// Country whose filing calendar applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Jurisdiction {
    Gabon,
    Ghana,
    France,
}

impl Jurisdiction {
    pub const ALL: [Jurisdiction; 3] = [
        Jurisdiction::Gabon,
        Jurisdiction::Ghana,
        Jurisdiction::France,
    ];

    pub fn from_str(s: &str) -> Option<Jurisdiction> {
        match s.trim().to_lowercase().as_str() {
            "gabon" | "gab" => Some(Jurisdiction::Gabon),
            "ghana" | "gha" => Some(Jurisdiction::Ghana),
            "france" | "fra" => Some(Jurisdiction::France),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Jurisdiction::Gabon => "Gabon",
            Jurisdiction::Ghana => "Ghana",
            Jurisdiction::France => "France",
        }
    }

    /// Three letter code used in registration ids
    pub fn code(&self) -> &'static str {
        match self {
            Jurisdiction::Gabon => "GAB",
            Jurisdiction::Ghana => "GHA",
            Jurisdiction::France => "FRA",
        }
    }

    /// Day of the month by which the previous month's taxes are due
    pub fn monthly_due_day(&self) -> u32 {
        match self {
            Jurisdiction::Gabon => 20,
            Jurisdiction::Ghana => 25,
            Jurisdiction::France => 15,
        }
    }

    /// Corporate tax installment dates for a calendar year (Gabon only)
    pub fn corporate_installments(&self, year: i32) -> Vec<NaiveDate> {
        match self {
            Jurisdiction::Gabon => [(3, 31), (6, 30), (9, 30), (12, 31)]
                .iter()
                .filter_map(|&(m, d)| NaiveDate::from_ymd_opt(year, m, d))
                .collect(),
            Jurisdiction::Ghana | Jurisdiction::France => Vec::new(),
        }
    }

    /// Deadline of the annual statistical and tax return for a fiscal year (Gabon only)
    pub fn annual_return_due(&self, fiscal_year: i32) -> Option<NaiveDate> {
        match self {
            Jurisdiction::Gabon => NaiveDate::from_ymd_opt(fiscal_year.checked_add(1)?, 4, 30),
            Jurisdiction::Ghana | Jurisdiction::France => None,
        }
    }
}

impl std::fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Monthly due day for a country name, falling back to [`DEFAULT_DUE_DAY`]
pub fn due_day_for(country: &str) -> u32 {
    Jurisdiction::from_str(country).map_or(DEFAULT_DUE_DAY, |j| j.monthly_due_day())
}

// due days never exceed 28 so every month has one
fn due_date_in(year: i32, month: u32, due_day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, due_day.min(28))
}

/// Due date within the month of `date`
fn due_date_of(date: NaiveDate, due_day: u32) -> NaiveDate {
    date.with_day(due_day.min(28)).unwrap_or(date)
}

/// Date by which taxes for month `period` (0 = January) of `year` are due:
/// the due day of the following month.
///
/// `None` for an invalid period or when the due date falls outside the
/// representable date range.
pub fn monthly_due_date(jurisdiction: Jurisdiction, year: i32, period: u8) -> Option<NaiveDate> {
    if period > 11 {
        return None;
    }
    let (due_year, due_month) = if period == 11 {
        (year.checked_add(1)?, 1)
    } else {
        (year, period as u32 + 2)
    };
    due_date_in(due_year, due_month, jurisdiction.monthly_due_day())
}

/// Where an entity stands with its monthly payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Paid,
    Due,
    Overdue,
}

impl PaymentStatus {
    /// Classify from the last payment date.
    ///
    /// Overdue when nothing was paid since before last month's due date, paid
    /// when a payment was made this month, otherwise due.
    pub fn classify(
        last_payment: Option<NaiveDate>,
        today: NaiveDate,
        jurisdiction: Jurisdiction,
    ) -> PaymentStatus {
        let cycle = Cycle::containing(today, jurisdiction);
        match last_payment {
            None => PaymentStatus::Overdue,
            Some(paid) if paid < cycle.previous_due => PaymentStatus::Overdue,
            Some(paid) if paid >= cycle.month_start => PaymentStatus::Paid,
            Some(_) => PaymentStatus::Due,
        }
    }

    /// Draw a status: 30% overdue, 40% due, 30% paid
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> PaymentStatus {
        let roll: f64 = rng.random();
        if roll < 0.3 {
            PaymentStatus::Overdue
        } else if roll < 0.7 {
            PaymentStatus::Due
        } else {
            PaymentStatus::Paid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Due => "due",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Draw a last payment date that [`PaymentStatus::classify`] maps back to `status`
pub fn simulate_last_payment<R: Rng + ?Sized>(
    status: PaymentStatus,
    today: NaiveDate,
    jurisdiction: Jurisdiction,
    rng: &mut R,
) -> NaiveDate {
    let cycle = Cycle::containing(today, jurisdiction);
    let before = |date: NaiveDate, days: u64| {
        date.checked_sub_days(Days::new(days)).unwrap_or(date)
    };
    let after = |date: NaiveDate, days: u64| {
        date.checked_add_days(Days::new(days)).unwrap_or(date)
    };
    match status {
        PaymentStatus::Overdue => before(cycle.previous_due, rng.random_range(1..=10)),
        PaymentStatus::Due => {
            let last_of_previous_month = before(cycle.month_start, 1);
            after(cycle.previous_due, rng.random_range(0..=5)).min(last_of_previous_month)
        }
        PaymentStatus::Paid => {
            before(cycle.current_due, rng.random_range(0..=5)).max(cycle.month_start)
        }
    }
}

/// Dates bounding the filing cycle that `today` falls in
struct Cycle {
    month_start: NaiveDate,
    previous_due: NaiveDate,
    current_due: NaiveDate,
}

impl Cycle {
    fn containing(today: NaiveDate, jurisdiction: Jurisdiction) -> Cycle {
        let due_day = jurisdiction.monthly_due_day();
        let month_start = due_date_of(today, 1);
        let previous_due = month_start
            .checked_sub_months(Months::new(1))
            .map_or(month_start, |previous_month| due_date_of(previous_month, due_day));
        Cycle {
            month_start,
            previous_due,
            current_due: due_date_of(today, due_day),
        }
    }
}
