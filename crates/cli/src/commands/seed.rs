//! Seed the database with demo content.
//!
//! Every insert is `ON CONFLICT DO NOTHING` on the natural key (slug,
//! locale/key, or name for team members), so running the command twice leaves
//! the data unchanged. `--reset` empties the content tables first; staff
//! accounts are never touched.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use super::{CommandError, connect};

struct SeedService {
    title: &'static str,
    slug: &'static str,
    description: &'static str,
    icon: &'static str,
    features: &'static [&'static str],
}

struct SeedProgram {
    title: &'static str,
    slug: &'static str,
    description: &'static str,
    duration: &'static str,
    level: &'static str,
    /// Price in cents; `None` for "contact us".
    price_cents: Option<i64>,
    featured: bool,
    features: &'static [&'static str],
}

struct SeedMember {
    name: &'static str,
    position: &'static str,
    bio: &'static str,
    linkedin_url: Option<&'static str>,
}

struct SeedProject {
    title: &'static str,
    slug: &'static str,
    description: &'static str,
    client: &'static str,
    category: &'static str,
    featured: bool,
    technologies: &'static [&'static str],
}

struct SeedPost {
    title: &'static str,
    slug: &'static str,
    post_type: &'static str,
    content: &'static str,
}

const SERVICES: &[SeedService] = &[
    SeedService {
        title: "AI Strategy Consulting",
        slug: "ai-strategy-consulting",
        description: "Find where machine learning pays off in your business and plan the rollout.",
        icon: "compass",
        features: &["Opportunity assessment", "Data readiness audit", "Roadmap"],
    },
    SeedService {
        title: "Corporate Training",
        slug: "corporate-training",
        description: "Hands-on workshops that get your teams productive with AI tools.",
        icon: "users",
        features: &["On-site or remote", "Custom curriculum", "Certificates"],
    },
    SeedService {
        title: "Custom AI Solutions",
        slug: "custom-ai-solutions",
        description: "Prototypes and production systems built around your own data.",
        icon: "cpu",
        features: &["Proof of concept", "MLOps setup", "Ongoing support"],
    },
];

const PROGRAMS: &[SeedProgram] = &[
    SeedProgram {
        title: "AI Fundamentals",
        slug: "ai-fundamentals",
        description: "Core concepts of machine learning for newcomers.",
        duration: "4 weeks",
        level: "beginner",
        price_cents: Some(49_900),
        featured: true,
        features: &["Live sessions", "Weekly assignments", "Community access"],
    },
    SeedProgram {
        title: "Applied Machine Learning",
        slug: "applied-machine-learning",
        description: "Build, evaluate and ship models on real datasets.",
        duration: "8 weeks",
        level: "intermediate",
        price_cents: Some(129_900),
        featured: true,
        features: &["Capstone project", "Mentor reviews", "Career support"],
    },
    SeedProgram {
        title: "LLM Engineering",
        slug: "llm-engineering",
        description: "Retrieval, fine-tuning and evaluation of large language models.",
        duration: "6 weeks",
        level: "advanced",
        price_cents: None,
        featured: false,
        features: &["Small cohorts", "GPU credits"],
    },
];

const TEAM: &[SeedMember] = &[
    SeedMember {
        name: "Olena Kovalenko",
        position: "Founder & Lead Instructor",
        bio: "Ten years building recommendation systems before turning to teaching.",
        linkedin_url: Some("https://www.linkedin.com/in/example-olena"),
    },
    SeedMember {
        name: "Marcus Lee",
        position: "ML Engineer",
        bio: "Designs the hands-on labs and capstone projects.",
        linkedin_url: None,
    },
];

const PORTFOLIO: &[SeedProject] = &[
    SeedProject {
        title: "Retail Demand Forecasting",
        slug: "retail-demand-forecasting",
        description: "Cut stock-outs for a grocery chain with weekly demand models.",
        client: "Northwind Grocers",
        category: "forecasting",
        featured: true,
        technologies: &["Python", "LightGBM", "Airflow"],
    },
    SeedProject {
        title: "Support Ticket Triage",
        slug: "support-ticket-triage",
        description: "Routed incoming tickets to the right team with a fine-tuned classifier.",
        client: "Contoso Telecom",
        category: "nlp",
        featured: false,
        technologies: &["Transformers", "FastAPI"],
    },
];

const POSTS: &[SeedPost] = &[
    SeedPost {
        title: "Welcome to the Academy",
        slug: "welcome-to-the-academy",
        post_type: "news",
        content: "We are opening enrollment for our first **AI Fundamentals** cohort.\n\nSee the programs page for dates.",
    },
    SeedPost {
        title: "Five Questions Before Starting an AI Project",
        slug: "five-questions-before-starting-an-ai-project",
        post_type: "blog",
        content: "## 1. What decision will the model support?\n\nStart from the decision, not the data.\n\n## 2. Do you have labels?\n\nMost projects stall here.",
    },
];

const TRANSLATIONS: &[(&str, &str)] = &[
    ("nav.home", "Home"),
    ("nav.services", "Services"),
    ("nav.programs", "Programs"),
    ("nav.team", "Team"),
    ("nav.portfolio", "Portfolio"),
    ("nav.blog", "Blog"),
    ("nav.contact", "Contact"),
    ("hero.title", "Learn AI with practitioners"),
    ("hero.subtitle", "Courses and consulting for teams adopting machine learning"),
    ("hero.cta", "Browse programs"),
    ("footer.rights", "All rights reserved"),
];

/// Rows inserted per table.
#[derive(Debug, Default)]
struct SeedSummary {
    services: u64,
    programs: u64,
    team: u64,
    portfolio: u64,
    posts: u64,
    translations: u64,
}

/// Seed demo content.
///
/// # Errors
///
/// Returns an error if the database URL is missing or any statement fails;
/// the whole run is rolled back in that case.
pub async fn run(reset: bool) -> Result<(), CommandError> {
    let pool = connect().await?;
    let author = first_admin(&pool).await?;
    if author.is_none() {
        tracing::warn!("No admin user found; posts will have no author");
    }

    let mut tx = pool.begin().await?;

    if reset {
        info!("Resetting content tables");
        sqlx::query(
            "TRUNCATE academy.post, academy.service, academy.program, academy.team_member,
                      academy.portfolio, academy.translation, academy.page_view
             RESTART IDENTITY",
        )
        .execute(&mut *tx)
        .await?;
    }

    let summary = SeedSummary {
        services: seed_services(&mut tx).await?,
        programs: seed_programs(&mut tx).await?,
        team: seed_team(&mut tx).await?,
        portfolio: seed_portfolio(&mut tx).await?,
        posts: seed_posts(&mut tx, author).await?,
        translations: seed_translations(&mut tx).await?,
    };

    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Services inserted: {}", summary.services);
    info!("  Programs inserted: {}", summary.programs);
    info!("  Team members inserted: {}", summary.team);
    info!("  Portfolio entries inserted: {}", summary.portfolio);
    info!("  Posts inserted: {}", summary.posts);
    info!("  Translations inserted: {}", summary.translations);

    Ok(())
}

async fn first_admin(pool: &PgPool) -> Result<Option<i32>, sqlx::Error> {
    sqlx::query_scalar("SELECT id FROM academy.user WHERE role = 'admin' ORDER BY id LIMIT 1")
        .fetch_optional(pool)
        .await
}

async fn seed_services(tx: &mut Transaction<'_, Postgres>) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for (order, service) in (0_i32..).zip(SERVICES) {
        inserted += sqlx::query(
            "INSERT INTO academy.service (title, slug, description, icon, features, display_order)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(service.title)
        .bind(service.slug)
        .bind(service.description)
        .bind(service.icon)
        .bind(service.features)
        .bind(order)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_programs(tx: &mut Transaction<'_, Postgres>) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for (order, program) in (0_i32..).zip(PROGRAMS) {
        let price = program.price_cents.map(|cents| Decimal::new(cents, 2));
        inserted += sqlx::query(
            "INSERT INTO academy.program
                 (title, slug, description, duration, level, price, features, is_featured, display_order)
             VALUES ($1, $2, $3, $4, $5::academy.program_level, $6, $7, $8, $9)
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(program.title)
        .bind(program.slug)
        .bind(program.description)
        .bind(program.duration)
        .bind(program.level)
        .bind(price)
        .bind(program.features)
        .bind(program.featured)
        .bind(order)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_team(tx: &mut Transaction<'_, Postgres>) -> Result<u64, sqlx::Error> {
    // team_member has no unique column; skip names that already exist.
    let mut inserted = 0;
    for (order, member) in (0_i32..).zip(TEAM) {
        inserted += sqlx::query(
            "INSERT INTO academy.team_member (name, position, bio, linkedin_url, display_order)
             SELECT $1, $2, $3, $4, $5
             WHERE NOT EXISTS (SELECT 1 FROM academy.team_member WHERE name = $1)",
        )
        .bind(member.name)
        .bind(member.position)
        .bind(member.bio)
        .bind(member.linkedin_url)
        .bind(order)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_portfolio(tx: &mut Transaction<'_, Postgres>) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for (order, project) in (0_i32..).zip(PORTFOLIO) {
        inserted += sqlx::query(
            "INSERT INTO academy.portfolio
                 (title, slug, description, client, category, technologies, is_featured, display_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(project.title)
        .bind(project.slug)
        .bind(project.description)
        .bind(project.client)
        .bind(project.category)
        .bind(project.technologies)
        .bind(project.featured)
        .bind(order)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_posts(
    tx: &mut Transaction<'_, Postgres>,
    author: Option<i32>,
) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for post in POSTS {
        inserted += sqlx::query(
            "INSERT INTO academy.post (title, slug, content, post_type, status, published_at, author_id)
             VALUES ($1, $2, $3, $4::academy.post_type, 'published', NOW(), $5)
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(post.title)
        .bind(post.slug)
        .bind(post.content)
        .bind(post.post_type)
        .bind(author)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

async fn seed_translations(tx: &mut Transaction<'_, Postgres>) -> Result<u64, sqlx::Error> {
    let mut inserted = 0;
    for (key, value) in TRANSLATIONS {
        inserted += sqlx::query(
            "INSERT INTO academy.translation (locale, key, value)
             VALUES ('en', $1, $2)
             ON CONFLICT (locale, key) DO NOTHING",
        )
        .bind(*key)
        .bind(*value)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use academy_core::{PostType, ProgramLevel, Slug};
    use academy_server::services::translations::validate_key;

    use super::*;

    fn assert_unique_valid_slugs<'a>(slugs: impl IntoIterator<Item = &'a str>) {
        let mut seen = HashSet::new();
        for slug in slugs {
            assert!(Slug::parse(slug).is_ok(), "invalid slug {slug}");
            assert!(seen.insert(slug), "duplicate slug {slug}");
        }
    }

    #[test]
    fn test_seed_slugs_are_valid_and_unique() {
        assert_unique_valid_slugs(SERVICES.iter().map(|s| s.slug));
        assert_unique_valid_slugs(PROGRAMS.iter().map(|p| p.slug));
        assert_unique_valid_slugs(PORTFOLIO.iter().map(|p| p.slug));
        assert_unique_valid_slugs(POSTS.iter().map(|p| p.slug));
    }

    #[test]
    fn test_seed_enums_match_database_labels() {
        for program in PROGRAMS {
            assert!(program.level.parse::<ProgramLevel>().is_ok(), "{}", program.level);
        }
        for post in POSTS {
            assert!(post.post_type.parse::<PostType>().is_ok(), "{}", post.post_type);
        }
    }

    #[test]
    fn test_seed_translation_keys_are_valid() {
        let mut seen = HashSet::new();
        for (key, value) in TRANSLATIONS {
            assert!(validate_key(key).is_ok(), "{key}");
            assert!(!value.is_empty());
            assert!(seen.insert(*key), "duplicate key {key}");
        }
    }

    #[test]
    fn test_seed_prices_are_non_negative() {
        for program in PROGRAMS {
            if let Some(cents) = program.price_cents {
                assert!(Decimal::new(cents, 2) >= Decimal::ZERO);
            }
        }
    }
}
