//! Shared status icons with plain-text fallbacks.

use console::Emoji;

pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "[ERR]");
pub static SPARKLE: Emoji<'_, '_> = Emoji("✨ ", "*");
pub static FILE_NEW: Emoji<'_, '_> = Emoji("📄 ", "+");
pub static PENCIL: Emoji<'_, '_> = Emoji("📝 ", "~");
pub static RETRY: Emoji<'_, '_> = Emoji("🔄 ", "[RETRY]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[WARN]");
