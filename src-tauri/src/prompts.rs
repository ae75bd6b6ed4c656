//! Default prompt templates for colorization requests

/// Default styling instruction: Jingdezhen famille-rose (fencai) overglaze painting
pub const DEFAULT_COLORIZE_PROMPT: &str = "你是一位来自景德镇的粉彩瓷器手绘上色大师。请为这张线稿上色。上色风格要求严格遵循传统粉彩工艺：色彩要极为丰富、柔和且雅致。颜色的过渡必须非常细腻、自然，如同水彩般晕染开。最终的成品需要有玻璃质感的光泽，色彩水润通透，仿佛釉下的色彩在流动。请展现出粉彩'玻璃白'打底后，色彩的粉润、柔和之美。";
