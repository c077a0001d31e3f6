//! Built-in post templates and selector presentation data
//!
//! Templates are pre-authored post/image pairs with `[placeholder]` slots for
//! the user to fill in. The catalog is static and never mutated.

use crate::models::{AspectRatio, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub key: &'static str,
    pub label: &'static str,
    /// Icon identifier for the rendering layer.
    pub icon: &'static str,
    pub post: &'static str,
    pub image: &'static str,
}

static TEMPLATES: [Template; 4] = [
    Template {
        key: "product_launch",
        label: "Ra mắt sản phẩm",
        icon: "product-launch",
        post: "Chính thức ra mắt [Tên sản phẩm]! ✨\n\n\
Sau bao ngày chờ đợi, chúng tôi tự hào giới thiệu sản phẩm mới nhất, được thiết kế để [Lợi ích chính cho khách hàng].\n\n\
🌟 Tính năng nổi bật:\n\
- [Tính năng 1]\n\
- [Tính năng 2]\n\
- [Tính năng 3]\n\n\
👉 Khám phá ngay tại [Link sản phẩm/website] và trở thành một trong những người đầu tiên sở hữu!\n\n\
#ra_mắt_sản_phẩm #[TênThươngHiệu] #[TênSảnPhẩm]",
        image: "Hình ảnh sản phẩm [Tên sản phẩm] được trưng bày một cách chuyên nghiệp, trên nền sáng và tối giản, làm nổi bật các chi tiết thiết kế.",
    },
    Template {
        key: "event_announcement",
        label: "Thông báo sự kiện",
        icon: "event",
        post: "📢 THÔNG BÁO SỰ KIỆN ĐẶC BIỆT!\n\n\
Bạn đã sẵn sàng chưa? Hãy tham gia cùng chúng tôi tại sự kiện [Tên sự kiện]!\n\n\
🗓️ Thời gian: [Ngày], lúc [Giờ]\n\
📍 Địa điểm: [Địa điểm hoặc Link online]\n\n\
Đây là cơ hội tuyệt vời để [Mục đích sự kiện, ví dụ: gặp gỡ chuyên gia, học hỏi kiến thức mới, trải nghiệm sản phẩm].\n\n\
Đừng bỏ lỡ! Đăng ký tham gia ngay tại [Link đăng ký].\n\n\
#sự_kiện #[TênSựKiện] #[TênThươngHiệu]",
        image: "Một banner sự kiện hấp dẫn với tên sự kiện \"[Tên sự kiện]\" được in đậm, cùng với các biểu tượng liên quan đến chủ đề sự kiện.",
    },
    Template {
        key: "special_promotion",
        label: "Khuyến mãi",
        icon: "promotion",
        post: "🎉 KHUYẾN MÃI CỰC SỐC!\n\n\
Ưu đãi đặc biệt chỉ trong [Số] ngày! Giảm giá [Phần trăm]% cho [Sản phẩm/Dịch vụ].\n\n\
🎁 Đừng bỏ lỡ cơ hội sở hữu [Sản phẩm/Dịch vụ] yêu thích với mức giá tốt nhất từ trước đến nay.\n\n\
⏰ Thời gian áp dụng: Từ [Ngày bắt đầu] đến [Ngày kết thúc].\n\n\
👉 Mua ngay tại [Link sản phẩm/website]!\n\n\
#khuyến_mãi #[TênThươngHiệu] #sale",
        image: "Một hình ảnh quảng cáo rực rỡ với dòng chữ \"GIẢM GIÁ [Phần trăm]%\" nổi bật, xung quanh là hình ảnh của các sản phẩm đang được giảm giá.",
    },
    Template {
        key: "knowledge_sharing",
        label: "Chia sẻ kiến thức",
        icon: "knowledge",
        post: "💡 Mẹo hay bạn cần biết!\n\n\
Hôm nay, chúng tôi muốn chia sẻ một mẹo hữu ích về [Chủ đề].\n\n\
[Nội dung mẹo/chia sẻ kiến thức ngắn gọn].\n\n\
Hy vọng mẹo nhỏ này sẽ giúp bạn [Lợi ích mà mẹo mang lại].\n\n\
Bạn có mẹo nào khác muốn chia sẻ không? Hãy bình luận bên dưới nhé!\n\n\
#mẹo_hay #chia_sẻ_kiến_thức #[TênThươngHiệu] #[ChủĐề]",
        image: "Một hình ảnh đồ họa (infographic) đơn giản và sáng sủa, minh họa cho mẹo về [Chủ đề], với biểu tượng bóng đèn.",
    },
];

/// All templates in display order.
pub fn all() -> &'static [Template] {
    &TEMPLATES
}

/// Look up a template by key.
pub fn find(key: &str) -> Option<&'static Template> {
    TEMPLATES.iter().find(|template| template.key == key)
}

/// Presentation entry for a selector button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorOption<T> {
    pub value: T,
    pub label: &'static str,
    pub icon: &'static str,
    pub tooltip: Option<&'static str>,
}

pub fn tone_options() -> [SelectorOption<Tone>; 5] {
    Tone::ALL.map(|tone| {
        let (label, icon, tooltip) = match tone {
            Tone::Friendly => (
                "Thân thiện",
                "friendly",
                "Tạo giọng văn ấm áp, gần gũi và dễ tiếp cận.",
            ),
            Tone::Professional => (
                "Chuyên nghiệp",
                "professional",
                "Sử dụng ngôn ngữ trang trọng, lịch sự và có cấu trúc.",
            ),
            Tone::Humorous => (
                "Hài hước",
                "humorous",
                "Thêm yếu tố vui vẻ, dí dỏm để gây cười và giải trí.",
            ),
            Tone::Inspirational => (
                "Truyền cảm hứng",
                "inspirational",
                "Khơi dậy cảm xúc, động lực và sự tích cực.",
            ),
            Tone::Persuasive => (
                "Thuyết phục",
                "persuasive",
                "Kêu gọi hành động mạnh mẽ và thuyết phục người đọc.",
            ),
        };
        SelectorOption {
            value: tone,
            label,
            icon,
            tooltip: Some(tooltip),
        }
    })
}

pub fn aspect_ratio_options() -> [SelectorOption<AspectRatio>; 3] {
    AspectRatio::ALL.map(|ratio| {
        let (label, icon) = match ratio {
            AspectRatio::Square => ("Vuông", "square"),
            AspectRatio::Portrait => ("Dọc", "portrait"),
            AspectRatio::Landscape => ("Ngang", "landscape"),
        };
        SelectorOption {
            value: ratio,
            label,
            icon,
            tooltip: None,
        }
    })
}
