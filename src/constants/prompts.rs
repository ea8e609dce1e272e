pub const CATEGORIES: &[&str] = &[
    "Systems Thinking & Design (patterns that connect, wholeness, living structures, design principles)",
    "Urban Ecology & Community (Ivan Illich's convivial tools, James Scott's Legibility, Jane Jacobs's neighborhood wisdom, McLuhan's media)",
    "Cultural Anthropology (surprising cultural practices, rituals, social phenomena across civilizations)",
    "Theology & Spirituality (existential questions, religious traditions, contemplative practices)",
    "Philosophy & Ethics (existential insights, moral dilemmas, thought experiments, paradoxes)",
    "History's Turning Points (overlooked moments that changed everything, historical ironies)",
    "Music & Sound Theory (surprising acoustics, composition techniques, musical innovations)",
    "Visual Arts & Design (unexpected influences, techniques that revolutionized perception)",
    "Digital Culture (internet history, meme evolution, virtual communities, digital anthropology)",
    "Programming Languages & Paradigms (language design, compiler theory, type systems, runtime environments)",
    "Computer Science Theory (algorithmic complexity, formal verification, concurrency models)",
    "Literary Secrets (hidden meanings, author lives, unexpected connections between works)",
    "Scientific Paradigm Shifts (discoveries that changed worldviews, counterintuitive findings)",
    "Technology & Society (inventions that transformed human behavior, ethical intersections)",
    "Cognitive Science (how humans think, perceive, decide, and create meaning)",
    "Ancient Knowledge & Modern Discoveries (old wisdom validated by new research)",
    "Information Encoding & Cryptography (encoding schemes, error correction, security principles)",
    "Protocol Design & Technical Standards (TCP/IP, HTTP, WebRTC, technical evolution)",
    "Visual Data & Information Art (data visualization, aesthetic encoding, visual communication)",
    "Cross-Disciplinary Connections (where art meets technology, community meets code, design meets ethics)",
    "Open Source Communities (governance models, notable projects, community dynamics)",
    "Hardware Hacking & Physical Computing (Arduino, sensors, IoT, circuit design)",
    "Artificial Intelligence (LLMs, AI history, ethical considerations, future scenarios, creative applications)",
];

pub fn build_generation_prompt(batch_size: usize) -> String {
    let categories = CATEGORIES
        .iter()
        .map(|category| format!("- {}", category))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Create {batch_size} intellectually stimulating trivia questions that blend curiosity and insight for an art/tech audience.

ACTIVE CATEGORIES:
{categories}

QUESTION GUIDELINES:
1. Include a spectrum of questions from accessible to challenging, with tech-focused questions being notably more advanced
2. Create \"aha moment\" questions where the answer reveals an unexpected connection or insight
3. Bridge 2+ categories in some of the questions
4. Include questions with subtle historical ironies, paradoxes, or pattern-breaking examples
5. Include a smidge of questions related to visual encoding, QR codes, and information display as a nod to the exhibition theme
6. Aim for timeless questions rather than trending topics
7. For each batch, ensure questions span different categories to maintain diversity

FOR EACH QUESTION:
- Make sure it passes the \"that's interesting!\" test - would someone want to share this fact?
- Include exactly 4 options with only ONE correct answer
- Craft wrong answers that are plausible but clearly incorrect to someone who knows the topic
- Don't include obvious hints in the question that give away the answer
- Ensure each question is unique - avoid similar themes or patterns within a batch

The response must be valid JSON with the specified schema."
    )
}
