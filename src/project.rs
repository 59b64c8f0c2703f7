/// タイマーの開始前に選択するプロジェクト。
#[derive(Clone, Debug, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
}
