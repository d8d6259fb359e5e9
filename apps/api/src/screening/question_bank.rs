//! Question bank: canned per-technology questions used when external generation
//! is unavailable or returns an unusable result.

/// Template questions taken per technology when building the fallback pool.
pub const TEMPLATE_QUESTIONS_PER_TECH: usize = 2;

/// Per-technology question templates, keyed by normalized technology name.
const TEMPLATES: &[(&str, &[&str])] = &[
    (
        "python",
        &[
            "What are Python decorators and how do you use them?",
            "Explain the difference between lists and tuples in Python.",
            "How does memory management work in Python?",
            "What is the Global Interpreter Lock (GIL) and how does it affect multithreaded Python programs?",
            "Explain the concept of list comprehensions and provide an example.",
        ],
    ),
    (
        "javascript",
        &[
            "Explain the concept of closures in JavaScript.",
            "What is the difference between '==' and '===' operators?",
            "How does prototypal inheritance work in JavaScript?",
            "Explain the event loop in JavaScript.",
            "What are Promises and how do they differ from callbacks?",
        ],
    ),
    (
        "java",
        &[
            "What is the difference between an interface and an abstract class in Java?",
            "Explain the concept of Java's Garbage Collection.",
            "What are the key features introduced in Java 8?",
            "How does multithreading work in Java?",
            "Explain the principles of SOLID in Java programming.",
        ],
    ),
    (
        "rust",
        &[
            "Explain ownership and borrowing in Rust and how they prevent data races.",
            "When would you reach for a trait object instead of generics in Rust?",
            "How do lifetimes work and when do you need to annotate them explicitly?",
            "How does error handling with Result and the ? operator compare to exceptions?",
            "What does it mean for a type to be Send or Sync?",
        ],
    ),
    (
        "react",
        &[
            "What is the virtual DOM and how does React use it?",
            "Explain the component lifecycle in React.",
            "What are hooks in React and how do you use them?",
            "How do you manage state in a React application?",
            "Explain the concept of props and state in React components.",
        ],
    ),
    (
        "angular",
        &[
            "What is dependency injection in Angular?",
            "Explain the difference between components and directives in Angular.",
            "How does change detection work in Angular?",
            "What are Angular modules and how do they help organize code?",
            "Explain the concept of services in Angular.",
        ],
    ),
    (
        "vue",
        &[
            "What is the Vue instance lifecycle?",
            "Explain the difference between computed properties and methods in Vue.",
            "How does Vue's reactivity system work?",
            "What are Vue directives and how do you create custom directives?",
            "Explain the concept of mixins in Vue.",
        ],
    ),
    (
        "node.js",
        &[
            "How does the event loop work in Node.js?",
            "What is the purpose of middleware in Express.js?",
            "Explain the difference between process.nextTick() and setImmediate().",
            "How do you handle asynchronous operations in Node.js?",
            "What are streams in Node.js and how are they used?",
        ],
    ),
    (
        "django",
        &[
            "Explain Django's MTV (Model-Template-View) architecture.",
            "How do you create a custom middleware in Django?",
            "What are Django signals and how are they used?",
            "Explain Django's ORM and how it interacts with databases.",
            "How do you handle authentication and authorization in Django?",
        ],
    ),
    (
        "flask",
        &[
            "What is the application factory pattern in Flask?",
            "How do you handle database operations in Flask?",
            "Explain Flask's context globals (g, request, session).",
            "How do you implement authentication in a Flask application?",
            "What are Flask extensions and how do you use them?",
        ],
    ),
    (
        "sql",
        &[
            "Explain the difference between INNER JOIN and LEFT JOIN.",
            "What are database transactions and how do they ensure data integrity?",
            "How do you optimize a slow SQL query?",
            "Explain normalization and denormalization in database design.",
            "What are indexes and how do they improve query performance?",
        ],
    ),
    (
        "postgresql",
        &[
            "How does MVCC work in PostgreSQL and what role does VACUUM play?",
            "When would you choose a GIN index over a B-tree index in PostgreSQL?",
            "How do you read an EXPLAIN ANALYZE plan to find a slow query's bottleneck?",
            "What isolation levels does PostgreSQL support and how do they differ?",
            "How would you approach partitioning a very large PostgreSQL table?",
        ],
    ),
    (
        "mongodb",
        &[
            "What is sharding in MongoDB and how does it work?",
            "Explain the concept of document embedding vs. referencing in MongoDB.",
            "How do you ensure data consistency in a MongoDB database?",
            "What are MongoDB aggregation pipelines?",
            "Explain the concept of indexing in MongoDB.",
        ],
    ),
    (
        "docker",
        &[
            "What is the difference between a Docker image and a container?",
            "How do you persist data in Docker containers?",
            "Explain Docker networking and how containers communicate.",
            "What is Docker Compose and how is it used?",
            "How do you optimize Docker images for production?",
        ],
    ),
    (
        "kubernetes",
        &[
            "What are Kubernetes pods and how do they work?",
            "Explain the difference between a Deployment and a StatefulSet in Kubernetes.",
            "How does service discovery work in Kubernetes?",
            "What are Kubernetes operators and when would you use them?",
            "Explain Kubernetes resource limits and requests.",
        ],
    ),
    (
        "aws",
        &[
            "What is the difference between EC2 and Lambda?",
            "How do you design a highly available architecture in AWS?",
            "Explain AWS IAM and best practices for security.",
            "What are the different storage options in AWS and when would you use each?",
            "How do you implement auto-scaling in AWS?",
        ],
    ),
    (
        "devops",
        &[
            "Explain the concept of Infrastructure as Code.",
            "What is CI/CD and how does it improve the development process?",
            "How do you monitor applications in production?",
            "What strategies do you use for database migrations in a CI/CD pipeline?",
            "Explain the concept of blue-green deployment.",
        ],
    ),
    (
        "machine learning",
        &[
            "What is the difference between supervised and unsupervised learning?",
            "Explain overfitting and how to prevent it.",
            "What evaluation metrics do you use for classification problems?",
            "How do you handle imbalanced datasets?",
            "Explain the concept of feature engineering and why it's important.",
        ],
    ),
    (
        "data science",
        &[
            "What is the difference between correlation and causation?",
            "How do you handle missing data in a dataset?",
            "Explain the concept of dimensionality reduction and when you would use it.",
            "What statistical tests do you use to validate hypotheses?",
            "How do you communicate data insights to non-technical stakeholders?",
        ],
    ),
];

/// Common spellings mapped to their template key.
const ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("py", "python"),
    ("react.js", "react"),
    ("reactjs", "react"),
    ("vue.js", "vue"),
    ("vuejs", "vue"),
    ("angular.js", "angular"),
    ("angularjs", "angular"),
    ("node", "node.js"),
    ("nodejs", "node.js"),
    ("postgres", "postgresql"),
    ("postgres sql", "postgresql"),
    ("mongo", "mongodb"),
    ("k8s", "kubernetes"),
    ("ml", "machine learning"),
    ("ai", "machine learning"),
    ("artificial intelligence", "machine learning"),
];

/// Cross-technology questions used to top up a short fallback pool.
pub const GENERIC_QUESTIONS: &[&str] = &[
    "How do you approach learning new technologies?",
    "Describe a project where you integrated multiple technologies.",
    "How do you handle debugging across different technology stacks?",
    "What's your approach to code review and quality assurance?",
    "How do you stay updated with the latest technology trends?",
];

/// Lowercases a technology name and maps known aliases. Unknown names pass through.
pub fn normalize_tech_name(tech: &str) -> String {
    let lower = tech.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == lower)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or(lower)
}

/// Full template list for a technology, if the bank covers it.
pub fn templates_for(tech: &str) -> Option<&'static [&'static str]> {
    let key = normalize_tech_name(tech);
    TEMPLATES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, questions)| *questions)
}

/// Up to `limit` questions for one technology. Technologies outside the bank get
/// three generic questions naming the technology as the candidate wrote it.
pub fn questions_for(tech: &str, limit: usize) -> Vec<String> {
    match templates_for(tech) {
        Some(questions) => questions
            .iter()
            .take(limit)
            .map(|q| q.to_string())
            .collect(),
        None => vec![
            format!("What experience do you have with {tech}?"),
            format!("Describe a challenging problem you solved using {tech}."),
            format!("What are the best practices you follow when working with {tech}?"),
        ],
    }
}
