//! Initial catalog content written when a store is empty.

use crate::model::band::NewBand;
use crate::model::song::NewSong;

const PLACEHOLDER_LYRICS: &str = "歌词内容...";

pub(crate) fn seed_bands() -> Vec<NewBand> {
    vec![
        NewBand::new(
            "MyGO!!!!!",
            "迷失自我，但却向前。她们以充满情感的摇滚乐，表达年轻人的迷茫与坚定。",
        ),
        NewBand::new(
            "Ave Mujica",
            "虚伪的假面，真实的自我。这是一个神秘且充满戏剧性的交响乐团，每个成员都带着面具。",
        ),
        NewBand::new(
            "Morfonica",
            "如梦似幻的交响乐团。她们以小提琴为主轴，演奏出优雅而华丽的乐章。",
        ),
    ]
}

pub(crate) fn seed_songs() -> Vec<NewSong> {
    vec![
        NewSong::new("黑色生日", "Ave Mujica")
            .with_author("Doloris")
            .with_lyrics(PLACEHOLDER_LYRICS),
        NewSong::new("迷星叫", "MyGO!!!!!")
            .with_author("MyGO!!!!!")
            .with_lyrics(PLACEHOLDER_LYRICS),
    ]
}
