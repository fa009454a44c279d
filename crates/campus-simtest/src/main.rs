//! Campus Sim Headless Simulation Harness
//!
//! Validates content tables and formulas, then plays complete sessions
//! with a fixed policy. Runs entirely in-process with no front end.
//!
//! Usage:
//!   cargo run -p campus-simtest
//!   cargo run -p campus-simtest -- --verbose
//!   cargo run -p campus-simtest -- --games 200 --seed 7 --config sim.json --json

use std::collections::BTreeMap;

use campus_core::prelude::*;
use campus_logic::content::{self, FamilyTier};
use campus_logic::events::{self, EventRegistry};
use campus_logic::sampler;
use campus_logic::scoring;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

struct Args {
    verbose: bool,
    json: bool,
    games: u64,
    seed: u64,
    config: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let mut args = Args {
            verbose: false,
            json: false,
            games: 60,
            seed: 1,
            config: None,
        };
        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--verbose" => args.verbose = true,
                "--json" => args.json = true,
                "--games" => {
                    args.games = iter.next().and_then(|v| v.parse().ok()).unwrap_or(args.games)
                }
                "--seed" => args.seed = iter.next().and_then(|v| v.parse().ok()).unwrap_or(args.seed),
                "--config" => args.config = iter.next(),
                other => eprintln!("Ignoring unknown argument {}", other),
            }
        }
        args
    }
}

fn main() {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    println!("=== Campus Sim Harness ===\n");

    let base_config = match &args.config {
        Some(path) => match SimConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => SimConfig::default(),
    };

    let mut results = Vec::new();

    // 1. Event content
    results.extend(validate_event_content(args.verbose));

    // 2. Faculties, families, credit plans
    results.extend(validate_enrollment_tables(args.verbose));

    // 3. GPA formula sweep
    results.extend(validate_gpa_formula(args.verbose));

    // 4. Weighted sampler
    results.extend(validate_sampler(args.verbose));

    // 5. Full sessions
    let (session_results, summary) = run_sessions(&args, &base_config);
    results.extend(session_results);

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || args.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("\n{}", json),
            Err(e) => log::warn!("Could not encode session summary: {}", e),
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Event Content ────────────────────────────────────────────────────

fn validate_event_content(verbose: bool) -> Vec<TestResult> {
    println!("--- Event Content ---");
    let mut results = Vec::new();

    let registry = match EventRegistry::builtin() {
        Ok(r) => r,
        Err(e) => {
            results.push(TestResult {
                name: "events_parse".into(),
                passed: false,
                detail: format!("built-in events rejected: {}", e),
            });
            return results;
        }
    };

    results.push(TestResult {
        name: "events_not_empty".into(),
        passed: registry.len() >= 10,
        detail: format!("{} events loaded", registry.len()),
    });

    // Effect and cost labels must name a stat
    let mut unknown = Vec::new();
    for event in registry.events() {
        for option in &event.options {
            for key in option.cost.unknown_keys() {
                unknown.push(format!("{}/{} cost `{}`", event.id, option.id, key));
            }
            for outcome in &option.outcomes {
                for sub in &outcome.sub_outcomes {
                    for key in sub.effects.unknown_keys() {
                        unknown.push(format!("{}/{} effect `{}`", event.id, option.id, key));
                    }
                }
            }
        }
    }
    results.push(TestResult {
        name: "events_known_labels".into(),
        passed: unknown.is_empty(),
        detail: if unknown.is_empty() {
            "every effect label names a stat".into()
        } else {
            unknown.join(", ")
        },
    });

    // A free option means the prompt can always be answered
    let no_free: Vec<&str> = registry
        .events()
        .iter()
        .filter(|e| !e.options.iter().any(|o| o.cost.is_empty()))
        .map(|e| e.id.as_str())
        .collect();
    results.push(TestResult {
        name: "events_free_option".into(),
        passed: no_free.is_empty(),
        detail: if no_free.is_empty() {
            "every event has a free option".into()
        } else {
            format!("no free option: {}", no_free.join(", "))
        },
    });

    // Major allowlists must name a real college or faculty
    let bad_majors: Vec<String> = registry
        .events()
        .iter()
        .flat_map(|e| e.major_names.iter().map(move |m| (e.id.as_str(), m)))
        .filter(|(_, m)| {
            !Faculty::all()
                .iter()
                .any(|f| f.info().name == m.as_str() || f.offers_college(m))
        })
        .map(|(id, m)| format!("{} -> {}", id, m))
        .collect();
    results.push(TestResult {
        name: "events_major_names".into(),
        passed: bad_majors.is_empty(),
        detail: if bad_majors.is_empty() {
            "all major allowlists resolve".into()
        } else {
            bad_majors.join(", ")
        },
    });

    let election = registry.get(campus_logic::constants::events::SEPTEMBER_EVENT);
    results.push(TestResult {
        name: "events_september_election".into(),
        passed: election.map_or(false, |e| e.repeatable && e.months == [9]),
        detail: "forced September event present and repeatable".into(),
    });

    if verbose {
        let mut by_category: BTreeMap<&str, usize> = BTreeMap::new();
        for event in registry.events() {
            *by_category.entry(event.category.label()).or_default() += 1;
        }
        println!("  Events by category:");
        for (category, count) in by_category {
            println!("    {:14}: {}", category, count);
        }
    }

    results
}

// ── 2. Enrollment Tables ────────────────────────────────────────────────

fn validate_enrollment_tables(_verbose: bool) -> Vec<TestResult> {
    println!("--- Enrollment Tables ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(2021);

    for faculty in Faculty::all() {
        let info = faculty.info();
        let plans_ok = (0..200).all(|_| {
            let plan = content::generate_credit_plan(info.credits, &mut rng);
            plan.len() == 6 && plan.iter().sum::<u32>() == info.credits
        });
        results.push(TestResult {
            name: format!("credit_plan_{:?}", faculty).to_lowercase(),
            passed: plans_ok && !info.colleges.is_empty(),
            detail: format!(
                "{} credits, {} colleges, threshold {:.1}",
                info.credits,
                info.colleges.len(),
                info.baoyan_threshold
            ),
        });
    }

    let draws = 20_000;
    let poor = (0..draws)
        .filter(|_| content::roll_family(&mut rng) == FamilyTier::Poor)
        .count();
    let total: f64 = FamilyTier::all().iter().map(|t| t.info().weight).sum();
    let expected = FamilyTier::Poor.info().weight / total;
    let observed = poor as f64 / draws as f64;
    results.push(TestResult {
        name: "family_roll_weights".into(),
        passed: (observed - expected).abs() < 0.02,
        detail: format!("poor tier {:.3} (expected {:.3})", observed, expected),
    });

    results
}

// ── 3. GPA Formula ──────────────────────────────────────────────────────

fn validate_gpa_formula(verbose: bool) -> Vec<TestResult> {
    println!("--- GPA Formula ---");
    let mut results = Vec::new();

    let mut out_of_range = 0;
    for effort in (-50..=2000).step_by(10) {
        for knowledge in 50..=100 {
            for health in [40, 65, 75, 90] {
                let gpa = scoring::semester_gpa(effort, knowledge, health);
                if !(2.4..=5.0).contains(&gpa) {
                    out_of_range += 1;
                }
            }
        }
    }
    results.push(TestResult {
        name: "gpa_range".into(),
        passed: out_of_range == 0,
        detail: format!("{} samples outside [2.4, 5.0]", out_of_range),
    });

    let monotonic = (1..1000).all(|e| {
        scoring::semester_gpa(e + 1, 80, 90) >= scoring::semester_gpa(e, 80, 90)
    });
    results.push(TestResult {
        name: "gpa_monotonic_in_effort".into(),
        passed: monotonic,
        detail: "more effort never lowers the semester GPA".into(),
    });

    let healthy = scoring::semester_gpa(100, 90, 90);
    let tired = scoring::semester_gpa(100, 90, 75);
    let sick = scoring::semester_gpa(100, 90, 65);
    results.push(TestResult {
        name: "gpa_health_penalty".into(),
        passed: (healthy - tired - 0.1).abs() < 1e-9 && (healthy - sick - 0.2).abs() < 1e-9,
        detail: format!("{:.2} / {:.2} / {:.2}", healthy, tired, sick),
    });

    if verbose {
        println!("  Semester GPA at knowledge 80, health 90:");
        for effort in [0, 20, 60, 100, 200, 400] {
            println!("    effort {:4}: {:.2}", effort, scoring::semester_gpa(effort, 80, 90));
        }
    }

    results
}

// ── 4. Weighted Sampler ─────────────────────────────────────────────────

fn validate_sampler(_verbose: bool) -> Vec<TestResult> {
    println!("--- Weighted Sampler ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(4);

    let items = [("a", 1.0), ("never", 0.0), ("b", 3.0)];
    let draws = 40_000;
    let mut counts = [0usize; 3];
    for _ in 0..draws {
        if let Some(i) = sampler::sample_index(&items, &mut rng) {
            counts[i] += 1;
        }
    }
    let share_b = counts[2] as f64 / draws as f64;
    results.push(TestResult {
        name: "sampler_proportional".into(),
        passed: (share_b - 0.75).abs() < 0.02,
        detail: format!("heavy item drawn {:.3} of the time", share_b),
    });
    results.push(TestResult {
        name: "sampler_skips_zero_weight".into(),
        passed: counts[1] == 0,
        detail: format!("zero-weight item drawn {} times", counts[1]),
    });

    let empty: [(&str, f64); 0] = [];
    results.push(TestResult {
        name: "sampler_empty".into(),
        passed: sampler::sample_index(&empty, &mut rng).is_none(),
        detail: "empty list yields nothing".into(),
    });

    results
}

// ── 5. Sessions ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize)]
struct SessionSummary {
    games: u64,
    graduated: u64,
    hospitalizations: u64,
    mean_gpa: f64,
    endings: BTreeMap<String, u64>,
}

fn answer_prompts(sim: &mut Simulation<NullPresenter>) -> Result<(), EngineError> {
    while let Some(waiting) = sim.awaiting().cloned() {
        match waiting {
            Awaiting::SemesterAck => sim.acknowledge_semester()?,
            Awaiting::EventChoice(id) => {
                let choice = sim
                    .registry()
                    .get(&id)
                    .and_then(|e| {
                        events::affordable_options(sim.state(), e)
                            .iter()
                            .position(|&ok| ok)
                    })
                    .unwrap_or(0);
                sim.submit_option(&id, choice)?;
            }
            Awaiting::Confirmation(_) => {
                if sim.confirm().is_err() {
                    sim.decline()?;
                }
            }
        }
    }
    Ok(())
}

fn offered(sim: &Simulation<NullPresenter>, preferred: &[&'static str]) -> Option<&'static str> {
    let actions = sim.available_actions();
    preferred
        .iter()
        .copied()
        .find(|id| actions.iter().any(|a| a.id == *id))
}

/// Study or write while energy lasts, rest otherwise; intern in the
/// second summer.
fn take_turn(sim: &mut Simulation<NullPresenter>) -> Result<(), EngineError> {
    if sim.diversion_open() {
        let college = sim.state().faculty.info().colleges[0];
        sim.complete_diversion(college)?;
    }
    let s = sim.state();
    let major = if s.energy < 30 {
        offered(sim, &["rest", "holiday_rest"])
    } else if s.year == 2023 && s.month == 7 {
        offered(sim, &["holiday_intern"])
    } else if s.thesis_progress < 150 {
        offered(sim, &["thesis", "study", "holiday_preview"])
    } else {
        offered(sim, &["job_hunt", "holiday_travel"])
    };
    if let Some(id) = major {
        let _ = sim.resolve(id);
        answer_prompts(sim)?;
    }
    if let Some(id) = offered(sim, &["rest", "holiday_rest"]) {
        let _ = sim.resolve(id);
    }
    Ok(())
}

fn play_session(faculty: Faculty, config: SimConfig) -> Result<(Simulation<NullPresenter>, u64), EngineError> {
    let mut sim = Simulation::new_game(faculty, config, NullPresenter)?;
    let mut hospitalizations = 0;
    for _ in 0..200 {
        answer_prompts(&mut sim)?;
        take_turn(&mut sim)?;
        answer_prompts(&mut sim)?;
        match sim.advance_month()? {
            Advance::Graduated(_) | Advance::AlreadyGraduated => break,
            Advance::Hospitalized => hospitalizations += 1,
            Advance::Advanced { .. } => {}
        }
    }
    Ok((sim, hospitalizations))
}

fn run_sessions(args: &Args, base: &SimConfig) -> (Vec<TestResult>, SessionSummary) {
    println!("--- Sessions ({} games) ---", args.games);
    let mut results = Vec::new();
    let mut summary = SessionSummary {
        games: args.games,
        ..SessionSummary::default()
    };
    let mut failures = Vec::new();
    let mut out_of_bounds = 0;
    let mut gpa_total = 0.0;

    for game in 0..args.games {
        let faculty = Faculty::all()[(game as usize) % Faculty::all().len()];
        let config = SimConfig {
            seed: Some(args.seed.wrapping_add(game)),
            autosave: false,
            ..base.clone()
        };
        match play_session(faculty, config) {
            Ok((sim, hospitalizations)) => {
                let s = sim.state();
                summary.hospitalizations += hospitalizations;
                gpa_total += s.gpa;
                if s.graduated {
                    summary.graduated += 1;
                }
                let bounded = [s.knowledge, s.skill, s.social, s.health]
                    .iter()
                    .all(|v| (50..=100).contains(v))
                    && (0..=100).contains(&s.energy);
                if !bounded {
                    out_of_bounds += 1;
                }
                if let Some(ending) = sim.ending() {
                    *summary.endings.entry(format!("{:?}", ending)).or_default() += 1;
                }
            }
            Err(e) => failures.push(format!("game {}: {}", game, e)),
        }
    }
    if args.games > 0 {
        summary.mean_gpa = gpa_total / args.games as f64;
    }

    results.push(TestResult {
        name: "sessions_complete".into(),
        passed: failures.is_empty() && summary.graduated == args.games,
        detail: if failures.is_empty() {
            format!("{}/{} sessions reached the ending", summary.graduated, args.games)
        } else {
            failures.join("; ")
        },
    });
    results.push(TestResult {
        name: "sessions_bounded".into(),
        passed: out_of_bounds == 0,
        detail: format!("{} sessions ended with a stat out of range", out_of_bounds),
    });
    results.push(TestResult {
        name: "sessions_gpa".into(),
        passed: args.games == 0 || (2.4..=5.0).contains(&summary.mean_gpa),
        detail: format!("mean cumulative GPA {:.2}", summary.mean_gpa),
    });

    if args.verbose {
        println!("  Endings:");
        for (ending, count) in &summary.endings {
            println!("    {:40}: {}", ending, count);
        }
        println!("  Hospitalizations: {}", summary.hospitalizations);
    }

    (results, summary)
}
